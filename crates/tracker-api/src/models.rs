//! Wire models for the SchoolTracker REST API.
//!
//! Field names follow the JSON returned by the API (snake_case). Ranks and
//! scores are strings on the wire and are kept that way. Identifiers and
//! numeric program fields may arrive as numbers or strings and are stored as
//! strings.

use serde::{Deserialize, Deserializer, Serialize};

/// Minimal institution projection used by listings and search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionSummary {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    pub country: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rank: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub overall_score: String,
}

/// Institution size classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Size {
    #[serde(rename = "Extra Large")]
    ExtraLarge,
    Large,
    Medium,
    Small,
}

impl Size {
    /// Wire value, also used as the `size` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Size::ExtraLarge => "Extra Large",
            Size::Large => "Large",
            Size::Medium => "Medium",
            Size::Small => "Small",
        }
    }
}

/// Institution subject-range classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Focus {
    #[serde(rename = "Full Comprehensive")]
    FullComprehensive,
    Comprehensive,
    Focused,
    Specialist,
}

impl Focus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Focus::FullComprehensive => "Full Comprehensive",
            Focus::Comprehensive => "Comprehensive",
            Focus::Focused => "Focused",
            Focus::Specialist => "Specialist",
        }
    }
}

/// Research intensity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Research {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
}

impl Research {
    pub fn as_str(&self) -> &'static str {
        match self {
            Research::VeryHigh => "Very High",
            Research::High => "High",
            Research::Medium => "Medium",
            Research::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub size: Size,
    pub focus: Focus,
    pub research: Research,
}

/// A single ranking metric (score plus rank within that metric)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricData {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub score: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rank: String,
}

/// Full institution record returned by `/institutions/{id}/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionDetail {
    #[serde(flatten)]
    pub summary: InstitutionSummary,
    #[serde(default)]
    pub web_links: String,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub academic_reputation: Option<MetricData>,
    #[serde(default)]
    pub employer_reputation: Option<MetricData>,
    #[serde(default)]
    pub faculty_student: Option<MetricData>,
    #[serde(default)]
    pub citations_per_faculty: Option<MetricData>,
    #[serde(default)]
    pub international_faculty: Option<MetricData>,
    #[serde(default)]
    pub international_students: Option<MetricData>,
    #[serde(default)]
    pub international_research_network: Option<MetricData>,
    #[serde(default)]
    pub employment_outcomes: Option<MetricData>,
    #[serde(default)]
    pub sustainability: Option<MetricData>,
}

impl InstitutionDetail {
    pub fn id(&self) -> &str {
        &self.summary.id
    }

    pub fn name(&self) -> &str {
        &self.summary.name
    }
}

/// Institution fields denormalized onto an application record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstitutionRef {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub rank: String,
    pub name: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub country: String,
    #[serde(default)]
    pub overall_score: Option<String>,
}

impl InstitutionRef {
    /// Project into the summary shape used by listings. A missing score
    /// becomes an empty string.
    pub fn to_summary(&self) -> InstitutionSummary {
        InstitutionSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            country: self.country.clone(),
            rank: self.rank.clone(),
            overall_score: self.overall_score.clone().unwrap_or_default(),
        }
    }
}

/// Degree awarded by an application's program
///
/// Values outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DegreeType {
    Associate,
    Bachelor,
    Master,
    PhD,
    Certificate,
    Diploma,
    Other(String),
}

impl DegreeType {
    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            DegreeType::Associate => "Associate",
            DegreeType::Bachelor => "Bachelor",
            DegreeType::Master => "Master",
            DegreeType::PhD => "PhD",
            DegreeType::Certificate => "Certificate",
            DegreeType::Diploma => "Diploma",
            DegreeType::Other(raw) => raw,
        }
    }
}

impl From<String> for DegreeType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Associate" => DegreeType::Associate,
            "Bachelor" => DegreeType::Bachelor,
            "Master" => DegreeType::Master,
            "PhD" => DegreeType::PhD,
            "Certificate" => DegreeType::Certificate,
            "Diploma" => DegreeType::Diploma,
            _ => DegreeType::Other(raw),
        }
    }
}

impl From<DegreeType> for String {
    fn from(degree: DegreeType) -> Self {
        match degree {
            DegreeType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DegreeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Draft,
    #[serde(rename = "In Progress")]
    InProgress,
    Submitted,
    Interview,
    Accepted,
    Rejected,
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApplicationStatus::Draft => write!(f, "Draft"),
            ApplicationStatus::InProgress => write!(f, "In Progress"),
            ApplicationStatus::Submitted => write!(f, "Submitted"),
            ApplicationStatus::Interview => write!(f, "Interview"),
            ApplicationStatus::Accepted => write!(f, "Accepted"),
            ApplicationStatus::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A tracked application to one program at one institution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub id: i64,
    #[serde(default)]
    pub institution_name: Option<String>,
    #[serde(default)]
    pub institution_country: Option<String>,
    /// Raw institution identifier as stored on the application
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub institution: Option<String>,
    #[serde(default)]
    pub institution_details: Option<InstitutionRef>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub program_name: String,
    #[serde(default)]
    pub degree_type: Option<DegreeType>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub duration_years: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub tuition_fee: Option<String>,
    #[serde(default)]
    pub application_link: Option<String>,
    #[serde(default)]
    pub scholarship_link: Option<String>,
    #[serde(default)]
    pub program_info_link: Option<String>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub submitted_date: Option<String>,
    #[serde(default)]
    pub decision_date: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Application {
    /// Best available institution name: the denormalized detail name, then
    /// the plain name field, then the raw identifier. Empty values are skipped.
    pub fn institution_label(&self) -> &str {
        self.institution_details
            .as_ref()
            .map(|d| d.name.as_str())
            .into_iter()
            .chain(self.institution_name.as_deref())
            .chain(self.institution.as_deref())
            .find(|name| !name.is_empty())
            .unwrap_or("")
    }
}

/// Kind of an uploaded document
///
/// Values outside the known set are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentType {
    Transcript,
    Essay,
    Cv,
    RecommendationLetter,
    Other(String),
}

impl DocumentType {
    /// Wire value
    pub fn as_str(&self) -> &str {
        match self {
            DocumentType::Transcript => "Transcript",
            DocumentType::Essay => "Essay",
            DocumentType::Cv => "CV",
            DocumentType::RecommendationLetter => "Recommendation Letter",
            DocumentType::Other(raw) => raw,
        }
    }
}

impl From<String> for DocumentType {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "Transcript" => DocumentType::Transcript,
            "Essay" => DocumentType::Essay,
            "CV" => DocumentType::Cv,
            "Recommendation Letter" => DocumentType::RecommendationLetter,
            _ => DocumentType::Other(raw),
        }
    }
}

impl From<DocumentType> for String {
    fn from(kind: DocumentType) -> Self {
        match kind {
            DocumentType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application reference on a document; the API sends either a number or a string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ApplicationRef {
    Id(i64),
    Key(String),
}

/// Short application summary embedded in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationInfo {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub program_name: String,
    /// Empty when the application has no institution
    #[serde(default, deserialize_with = "null_as_empty")]
    pub institution_name: String,
    #[serde(default)]
    pub degree_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    pub document_type: DocumentType,
    pub file_name: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub uploaded_at: String,
    #[serde(default)]
    pub application_id: Option<ApplicationRef>,
    #[serde(default)]
    pub application_info: Option<ApplicationInfo>,
}

/// A calendar event, optionally tied to an application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    #[serde(default)]
    pub application: Option<i64>,
    pub event_title: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_color: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub event_date: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Accept `null` where the API nominally sends a string
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Unsigned(u64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::String(s) => s,
            StringOrNumber::Integer(n) => n.to_string(),
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

/// Accept a JSON number where a string identifier is expected
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(StringOrNumber::deserialize(deserializer)?.into_string())
}

fn opt_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(StringOrNumber::into_string))
}
