//! # Registrations
//!
//! Strict record kept for each accepted submission, plus the listing and
//! statistics helpers shared by every store backend.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::validate::{Submission, as_text, is_empty};

pub const MAX_EXPECTATIONS_CHARS: usize = 1000;
pub const DEFAULT_PAGE_LIMIT: usize = 50;
pub const MAX_PAGE_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Experience {
    Beginner,
    Intermediate,
    Advanced,
}

impl Experience {
    fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "beginner" => Some(Self::Beginner),
            "intermediate" => Some(Self::Intermediate),
            "advanced" => Some(Self::Advanced),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

/// Year of study, 1 through 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Year(u8);

impl TryFrom<u8> for Year {
    type Error = String;

    fn try_from(year: u8) -> Result<Self, Self::Error> {
        if (1..=4).contains(&year) {
            Ok(Self(year))
        } else {
            Err(format!("year {year} is outside 1-4"))
        }
    }
}

impl From<Year> for u8 {
    fn from(year: Year) -> Self {
        year.0
    }
}

impl Year {
    /// Accepts `3` as well as labels like `"3rd Year"`.
    fn parse(text: &str) -> Option<Self> {
        let digits = text.trim().split(|c: char| !c.is_ascii_digit()).next()?;

        Self::try_from(digits.parse::<u8>().ok()?).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub college: String,
    pub year: Year,
    pub branch: String,
    pub experience: Experience,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expectations: Option<String>,
    pub registered_at: DateTime<Utc>,
    #[serde(default)]
    pub status: Status,
}

impl Registration {
    /// Maps a schema-valid submission onto the fixed record, collecting every problem.
    pub fn from_submission(submission: &Submission, now: DateTime<Utc>) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let mut text = |key: &str| -> String {
            match submission.get(key).and_then(as_text).filter(|t| !t.is_empty()) {
                Some(t) => t,
                None => {
                    errors.push(format!("{key} is required"));
                    String::new()
                }
            }
        };

        let name = text("name");
        let email = text("email").to_lowercase();
        let phone = text("phone");
        let college = text("college");
        let branch = text("branch");
        let year_text = text("year");
        let experience_text = text("experience");

        let year = Year::parse(&year_text);
        if year.is_none() && !year_text.is_empty() {
            errors.push("year must be one of 1, 2, 3, 4".to_string());
        }

        let experience = Experience::parse(&experience_text);
        if experience.is_none() && !experience_text.is_empty() {
            errors.push("experience must be beginner, intermediate or advanced".to_string());
        }

        let expectations = optional(submission, "expectations");
        if let Some(e) = &expectations {
            if e.chars().count() > MAX_EXPECTATIONS_CHARS {
                errors.push(format!(
                    "expectations must be at most {MAX_EXPECTATIONS_CHARS} characters"
                ));
            }
        }

        match (year, experience) {
            (Some(year), Some(experience)) if errors.is_empty() => Ok(Self {
                id: Uuid::new_v4(),
                name,
                email,
                phone,
                college,
                year,
                branch,
                experience,
                github: optional(submission, "github"),
                linkedin: optional(submission, "linkedin"),
                expectations,
                registered_at: now,
                status: Status::Pending,
            }),
            _ => Err(errors),
        }
    }

    fn matches(&self, needle: &str) -> bool {
        [&self.name, &self.email, &self.college]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn optional(submission: &Submission, key: &str) -> Option<String> {
    let value: Option<&Value> = submission.get(key);

    if is_empty(value) {
        return None;
    }

    value.and_then(as_text)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RegistrationQuery {
    /// Case-insensitive substring over name, email and college.
    pub search: Option<String>,
    pub status: Option<Status>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub pages: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub data: Vec<Registration>,
    pub pagination: Pagination,
}

impl RegistrationQuery {
    /// Filters, sorts newest first and slices one page.
    pub fn run(&self, mut registrations: Vec<Registration>) -> Page {
        if let Some(needle) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = needle.to_lowercase();
            registrations.retain(|r| r.matches(&needle));
        }

        if let Some(status) = self.status {
            registrations.retain(|r| r.status == status);
        }

        registrations.sort_by(|a, b| {
            b.registered_at
                .cmp(&a.registered_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let limit = self
            .limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT);
        let page = self.page.unwrap_or(1).max(1);
        let total = registrations.len();

        let data = registrations
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Page {
            data,
            pagination: Pagination {
                page,
                limit,
                total,
                pages: total.div_ceil(limit),
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total: usize,
    pub by_experience: BTreeMap<Experience, usize>,
    pub by_year: BTreeMap<u8, usize>,
}

impl Stats {
    pub fn collect<'a>(registrations: impl IntoIterator<Item = &'a Registration>) -> Self {
        let mut stats = Self::default();

        for registration in registrations {
            stats.total += 1;
            *stats.by_experience.entry(registration.experience).or_default() += 1;
            *stats.by_year.entry(registration.year.into()).or_default() += 1;
        }

        stats
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, 9, 0, 0).unwrap()
    }

    fn full() -> Submission {
        json!({
            "name": "Asha Rao",
            "email": "Asha@Example.com ",
            "phone": "+91 9876543210",
            "college": "NIT Trichy",
            "year": "2nd Year",
            "branch": "CSE",
            "experience": "Beginner",
            "github": "",
            "linkedin": "https://linkedin.com/in/asha",
            "unknown": "ignored"
        })
        .as_object()
        .cloned()
        .unwrap()
    }

    fn record(name: &str, college: &str, experience: Experience, year: u8, minutes: i64) -> Registration {
        Registration {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "9876543210".to_string(),
            college: college.to_string(),
            year: Year::try_from(year).unwrap(),
            branch: "CSE".to_string(),
            experience,
            github: None,
            linkedin: None,
            expectations: None,
            registered_at: now() + Duration::minutes(minutes),
            status: Status::Pending,
        }
    }

    #[test]
    fn converts_submission() {
        let r = Registration::from_submission(&full(), now()).unwrap();

        assert_eq!(r.email, "asha@example.com");
        assert_eq!(u8::from(r.year), 2);
        assert_eq!(r.experience, Experience::Beginner);
        assert_eq!(r.github, None);
        assert_eq!(r.linkedin.as_deref(), Some("https://linkedin.com/in/asha"));
        assert_eq!(r.status, Status::Pending);
        assert_eq!(r.registered_at, now());
    }

    #[test]
    fn numeric_year_is_accepted() {
        let mut submission = full();
        submission.insert("year".into(), json!(4));

        let r = Registration::from_submission(&submission, now()).unwrap();
        assert_eq!(u8::from(r.year), 4);
    }

    #[test]
    fn multi_digit_years_are_rejected() {
        for year in [json!(12), json!("10th"), json!("1999"), json!("Year 2")] {
            let mut submission = full();
            submission.insert("year".into(), year.clone());

            let errors = Registration::from_submission(&submission, now()).unwrap_err();
            assert_eq!(errors, vec!["year must be one of 1, 2, 3, 4"], "{year}");
        }
    }

    #[test]
    fn collects_every_conversion_problem() {
        let mut submission = full();
        submission.remove("college");
        submission.insert("year".into(), json!("5th Year"));
        submission.insert("experience".into(), json!("expert"));
        submission.insert("expectations".into(), json!("x".repeat(1001)));

        let errors = Registration::from_submission(&submission, now()).unwrap_err();

        assert_eq!(
            errors,
            vec![
                "college is required",
                "year must be one of 1, 2, 3, 4",
                "experience must be beginner, intermediate or advanced",
                "expectations must be at most 1000 characters",
            ]
        );
    }

    #[test]
    fn year_serializes_as_number() {
        let r = record("Ravi", "IIT", Experience::Advanced, 3, 0);
        let value = serde_json::to_value(&r).unwrap();

        assert_eq!(value["year"], 3);
        assert_eq!(value["experience"], "advanced");
        assert_eq!(value["status"], "pending");
        assert!(serde_json::from_value::<Year>(json!(7)).is_err());
    }

    #[test]
    fn query_filters_and_sorts_newest_first() {
        let rows = vec![
            record("Asha", "NIT Trichy", Experience::Beginner, 1, 0),
            record("Ravi", "IIT Madras", Experience::Advanced, 2, 5),
            record("Meera", "NIT Surathkal", Experience::Beginner, 1, 10),
        ];

        let page = RegistrationQuery {
            search: Some("nit".to_string()),
            ..Default::default()
        }
        .run(rows.clone());

        let names: Vec<_> = page.data.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Meera", "Asha"]);
        assert_eq!(page.pagination.total, 2);

        let page = RegistrationQuery {
            search: Some("RAVI@".to_string()),
            ..Default::default()
        }
        .run(rows);
        assert_eq!(page.data.len(), 1);
    }

    #[test]
    fn query_paginates() {
        let rows: Vec<_> = (0..5)
            .map(|i| record(&format!("P{i}"), "College", Experience::Beginner, 1, i))
            .collect();

        let page = RegistrationQuery {
            page: Some(2),
            limit: Some(2),
            ..Default::default()
        }
        .run(rows);

        let names: Vec<_> = page.data.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["P2", "P1"]);
        assert_eq!(
            page.pagination,
            Pagination {
                page: 2,
                limit: 2,
                total: 5,
                pages: 3,
            }
        );
    }

    #[test]
    fn stats_group_by_experience_and_year() {
        let rows = [
            record("A", "X", Experience::Beginner, 1, 0),
            record("B", "X", Experience::Beginner, 2, 0),
            record("C", "X", Experience::Advanced, 2, 0),
        ];

        let stats = Stats::collect(&rows);

        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.by_experience,
            BTreeMap::from([(Experience::Beginner, 2), (Experience::Advanced, 1)])
        );
        assert_eq!(stats.by_year, BTreeMap::from([(1, 1), (2, 2)]));

        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["byExperience"], json!({ "beginner": 2, "advanced": 1 }));
        assert_eq!(value["byYear"], json!({ "1": 1, "2": 2 }));
    }
}
