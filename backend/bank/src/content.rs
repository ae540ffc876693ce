use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::ordered::Ordered;

macro_rules! ordered_entry {
    ($entry:ty) => {
        impl Ordered for $entry {
            fn order(&self) -> u32 {
                self.order
            }

            fn set_order(&mut self, order: u32) {
                self.order = order;
            }

            fn visible(&self) -> bool {
                self.visible
            }

            fn set_visible(&mut self, visible: bool) {
                self.visible = visible;
            }
        }
    };
}

fn visible_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ScheduleItem {
    pub time: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CurriculumItem {
    pub title: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BonusBenefit {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
}

ordered_entry!(ScheduleItem);
ordered_entry!(CurriculumItem);
ordered_entry!(BonusBenefit);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteInfo {
    pub bootcamp_date: NaiveDate,
    pub bootcamp_title: String,
    pub hero_title: String,
    pub hero_subtitle: String,
    pub about_description: String,
    pub registration_open: bool,
    /// Zero means no cap.
    pub max_participants: u32,
    pub current_participants: u32,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            bootcamp_date: NaiveDate::from_ymd_opt(2025, 11, 22).unwrap_or_default(),
            bootcamp_title: "Web Development Bootcamp".to_string(),
            hero_title: String::new(),
            hero_subtitle: String::new(),
            about_description: String::new(),
            registration_open: true,
            max_participants: 100,
            current_participants: 0,
        }
    }
}

/// Keys sent to the site-info endpoint. Absent keys keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteInfoPatch {
    pub bootcamp_date: Option<NaiveDate>,
    pub bootcamp_title: Option<String>,
    pub hero_title: Option<String>,
    pub hero_subtitle: Option<String>,
    pub about_description: Option<String>,
    pub registration_open: Option<bool>,
    pub max_participants: Option<u32>,
    pub current_participants: Option<u32>,
}

impl SiteInfo {
    pub fn merge(&mut self, patch: SiteInfoPatch) {
        let SiteInfoPatch {
            bootcamp_date,
            bootcamp_title,
            hero_title,
            hero_subtitle,
            about_description,
            registration_open,
            max_participants,
            current_participants,
        } = patch;

        if let Some(v) = bootcamp_date {
            self.bootcamp_date = v;
        }
        if let Some(v) = bootcamp_title {
            self.bootcamp_title = v;
        }
        if let Some(v) = hero_title {
            self.hero_title = v;
        }
        if let Some(v) = hero_subtitle {
            self.hero_subtitle = v;
        }
        if let Some(v) = about_description {
            self.about_description = v;
        }
        if let Some(v) = registration_open {
            self.registration_open = v;
        }
        if let Some(v) = max_participants {
            self.max_participants = v;
        }
        if let Some(v) = current_participants {
            self.current_participants = v;
        }
    }

    pub fn accepts_registration(&self, registered: usize) -> bool {
        self.registration_open
            && (self.max_participants == 0 || registered < self.max_participants as usize)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_only_touches_sent_keys() {
        let mut info = SiteInfo {
            hero_title: "Welcome".to_string(),
            ..SiteInfo::default()
        };

        let patch: SiteInfoPatch =
            serde_json::from_value(json!({ "registrationOpen": false })).unwrap();
        info.merge(patch);

        assert!(!info.registration_open);
        assert_eq!(info.bootcamp_title, "Web Development Bootcamp");
        assert_eq!(info.hero_title, "Welcome");
        assert_eq!(info.max_participants, 100);
    }

    #[test]
    fn serializes_camel_case_dates() {
        let value = serde_json::to_value(SiteInfo::default()).unwrap();

        assert_eq!(value["bootcampDate"], "2025-11-22");
        assert_eq!(value["registrationOpen"], true);
    }

    #[test]
    fn capacity_gate() {
        let mut info = SiteInfo {
            max_participants: 2,
            ..SiteInfo::default()
        };

        assert!(info.accepts_registration(1));
        assert!(!info.accepts_registration(2));

        info.max_participants = 0;
        assert!(info.accepts_registration(5_000));

        info.registration_open = false;
        assert!(!info.accepts_registration(0));
    }

    #[test]
    fn content_entries_default_visible() {
        let item: ScheduleItem =
            serde_json::from_value(json!({ "time": "10:00 AM", "title": "Setup", "order": 0 }))
                .unwrap();

        assert!(item.visible);
        assert!(item.description.is_empty());
    }
}
