//! CV document model — the schema the extraction model is asked to return and
//! the caller-supplied work history the pipeline reads.
//!
//! Deserialization is deliberately lenient: model output mixes numbers and
//! strings, nulls and empty strings, lists and comma-joined strings.

use serde::{Deserialize, Serialize};

/// One block of work history. Read-only to the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkEntry {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub to: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub role: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub project: String,
    #[serde(default, alias = "location", deserialize_with = "lenient::string")]
    pub city_country: String,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub bullets: Vec<String>,
}

impl WorkEntry {
    /// Role, project, location and bullets joined into one evidence string.
    pub fn evidence_blob(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.role, &self.project, &self.city_country];
        parts.extend(self.bullets.iter().map(String::as_str));
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub name_initials: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub position: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub nationality: Option<String>,
    #[serde(default, deserialize_with = "lenient::delimited_list")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub year_of_birth: Option<String>,
    #[serde(default, deserialize_with = "lenient::months")]
    pub total_experience_months: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationDetail {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub degree: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub institution: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub city_country: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub year: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EducationItem {
    Line(String),
    Detailed(EducationDetail),
}

impl EducationItem {
    /// Render line for the education section; `None` when the item is empty.
    pub fn display(&self) -> Option<String> {
        match self {
            EducationItem::Line(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            EducationItem::Detailed(d) => {
                let field = |v: &Option<String>| {
                    v.as_deref()
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                };
                let (deg, inst, cc, yr) = (
                    field(&d.degree),
                    field(&d.institution),
                    field(&d.city_country),
                    field(&d.year),
                );
                if deg.is_none() && inst.is_none() && cc.is_none() && yr.is_none() {
                    return None;
                }
                let or_dash = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
                Some(format!(
                    "{} — {}, {} ({})",
                    or_dash(deg),
                    or_dash(inst),
                    or_dash(cc),
                    or_dash(yr)
                ))
            }
        }
    }
}

/// Structured CV as returned by the extraction model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CvDocument {
    #[serde(default)]
    pub identity: Identity,
    #[serde(default, deserialize_with = "lenient::string")]
    pub profile_summary: String,
    #[serde(default, deserialize_with = "lenient::items")]
    pub work_experiences: Vec<WorkEntry>,
    #[serde(default, deserialize_with = "lenient::items")]
    pub education: Vec<EducationItem>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient::string_list")]
    pub courses: Vec<String>,
}

mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn scalar(v: Value) -> Option<String> {
        match v {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(scalar(Value::deserialize(d)?))
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        Ok(opt_string(d)?.unwrap_or_default())
    }

    /// A list of strings; a lone string becomes a single item.
    pub fn string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items: Vec<String> = match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            other => scalar(other).into_iter().collect(),
        };
        Ok(items.into_iter().filter(|s| !s.trim().is_empty()).collect())
    }

    /// A list of strings; a lone string is split on commas and semicolons.
    pub fn delimited_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
        let items: Vec<String> = match Value::deserialize(d)? {
            Value::Array(items) => items.into_iter().filter_map(scalar).collect(),
            other => scalar(other)
                .map(|s| s.split([',', ';']).map(String::from).collect())
                .unwrap_or_default(),
        };
        Ok(items
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect())
    }

    /// Month counts arrive as integers, floats or numeric strings.
    pub fn months<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let months = match Value::deserialize(d)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        Ok(months.filter(|m| m.is_finite()).map(|m| m.trunc() as i64))
    }

    /// Keeps the elements that deserialize and silently drops the rest.
    pub fn items<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(d)? {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|v| serde_json::from_value(v).ok())
                .collect(),
            Value::Null => Vec::new(),
            other => serde_json::from_value(other).ok().into_iter().collect(),
        })
    }
}
