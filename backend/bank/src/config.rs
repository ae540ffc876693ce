//! # Site Config
//!
//! The single document behind the landing page.
//!
//! ## Sections
//!
//! - `formFields`, `schedule`, `curriculum`, `bonusBenefits`: ordered lists, replaced whole
//! - `siteInfo`, `contactInfo`: objects, new keys merged over stored ones
//! - `updatedAt`: stamped by every successful write
//!
//! Each section is written on its own, so updates to different sections never
//! clobber each other. Two writes to the same section are last-writer-wins.
use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    content::{BonusBenefit, CurriculumItem, ScheduleItem, SiteInfo, SiteInfoPatch},
    error::SchemaError,
    fields::{FieldDescriptor, FormSchema, default_form},
    ordered::OrderedList,
};

pub const UPDATED_AT_KEY: &str = "updatedAt";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SiteConfig {
    pub form_fields: FormSchema,
    pub schedule: OrderedList<ScheduleItem>,
    pub curriculum: OrderedList<CurriculumItem>,
    pub site_info: SiteInfo,
    pub bonus_benefits: OrderedList<BonusBenefit>,
    pub contact_info: Map<String, Value>,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            form_fields: default_form(),
            schedule: OrderedList::default(),
            curriculum: OrderedList::default(),
            site_info: SiteInfo::default(),
            bonus_benefits: OrderedList::default(),
            contact_info: Map::new(),
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    FormFields,
    Schedule,
    Curriculum,
    SiteInfo,
    BonusBenefits,
    ContactInfo,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::FormFields,
        Section::Schedule,
        Section::Curriculum,
        Section::SiteInfo,
        Section::BonusBenefits,
        Section::ContactInfo,
    ];

    /// JSON key of the section, both in the document and in request bodies.
    pub fn key(self) -> &'static str {
        match self {
            Section::FormFields => "formFields",
            Section::Schedule => "schedule",
            Section::Curriculum => "curriculum",
            Section::SiteInfo => "siteInfo",
            Section::BonusBenefits => "bonusBenefits",
            Section::ContactInfo => "contactInfo",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionUpdate {
    FormFields(Vec<FieldDescriptor>),
    Schedule(Vec<ScheduleItem>),
    Curriculum(Vec<CurriculumItem>),
    SiteInfo(SiteInfoPatch),
    BonusBenefits(Vec<BonusBenefit>),
    ContactInfo(Map<String, Value>),
}

impl SectionUpdate {
    pub fn section(&self) -> Section {
        match self {
            SectionUpdate::FormFields(_) => Section::FormFields,
            SectionUpdate::Schedule(_) => Section::Schedule,
            SectionUpdate::Curriculum(_) => Section::Curriculum,
            SectionUpdate::SiteInfo(_) => Section::SiteInfo,
            SectionUpdate::BonusBenefits(_) => Section::BonusBenefits,
            SectionUpdate::ContactInfo(_) => Section::ContactInfo,
        }
    }
}

/// Body of a whole-document write. Absent sections are left alone.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigReplacement {
    pub form_fields: Option<Vec<FieldDescriptor>>,
    pub schedule: Option<Vec<ScheduleItem>>,
    pub curriculum: Option<Vec<CurriculumItem>>,
    pub site_info: Option<SiteInfo>,
    pub bonus_benefits: Option<Vec<BonusBenefit>>,
    pub contact_info: Option<Map<String, Value>>,
}

impl SiteConfig {
    /// Applies one section write. Nothing changes when the write is rejected.
    pub fn apply(&mut self, update: SectionUpdate, now: DateTime<Utc>) -> Result<Section, SchemaError> {
        let section = update.section();

        match update {
            SectionUpdate::FormFields(fields) => {
                self.form_fields = OrderedList::replace_all(fields)?;
            }
            SectionUpdate::Schedule(items) => {
                self.schedule = OrderedList::replace_all(items)?;
            }
            SectionUpdate::Curriculum(items) => {
                self.curriculum = OrderedList::replace_all(items)?;
            }
            SectionUpdate::SiteInfo(patch) => self.site_info.merge(patch),
            SectionUpdate::BonusBenefits(items) => {
                self.bonus_benefits = OrderedList::replace_all(items)?;
            }
            SectionUpdate::ContactInfo(patch) => self.contact_info.extend(patch),
        }

        self.updated_at = now;

        Ok(section)
    }

    /// Checks every list first so a bad section leaves the whole document untouched.
    pub fn replace(&mut self, incoming: ConfigReplacement, now: DateTime<Utc>) -> Result<(), SchemaError> {
        let mut next = self.clone();

        if let Some(fields) = incoming.form_fields {
            next.form_fields = OrderedList::replace_all(fields)?;
        }
        if let Some(items) = incoming.schedule {
            next.schedule = OrderedList::replace_all(items)?;
        }
        if let Some(items) = incoming.curriculum {
            next.curriculum = OrderedList::replace_all(items)?;
        }
        if let Some(info) = incoming.site_info {
            next.site_info = info;
        }
        if let Some(items) = incoming.bonus_benefits {
            next.bonus_benefits = OrderedList::replace_all(items)?;
        }
        if let Some(contact) = incoming.contact_info {
            next.contact_info = contact;
        }

        next.updated_at = now;
        *self = next;

        Ok(())
    }

    pub fn section_value(&self, section: Section) -> serde_json::Result<Value> {
        match section {
            Section::FormFields => serde_json::to_value(&self.form_fields),
            Section::Schedule => serde_json::to_value(&self.schedule),
            Section::Curriculum => serde_json::to_value(&self.curriculum),
            Section::SiteInfo => serde_json::to_value(&self.site_info),
            Section::BonusBenefits => serde_json::to_value(&self.bonus_benefits),
            Section::ContactInfo => Ok(Value::Object(self.contact_info.clone())),
        }
    }

    /// Copies one section, plus the timestamp, from `other`.
    pub fn copy_section(&mut self, section: Section, other: &SiteConfig) {
        match section {
            Section::FormFields => self.form_fields = other.form_fields.clone(),
            Section::Schedule => self.schedule = other.schedule.clone(),
            Section::Curriculum => self.curriculum = other.curriculum.clone(),
            Section::SiteInfo => self.site_info = other.site_info.clone(),
            Section::BonusBenefits => self.bonus_benefits = other.bonus_benefits.clone(),
            Section::ContactInfo => self.contact_info = other.contact_info.clone(),
        }

        self.updated_at = other.updated_at;
    }

    /// Flattens the document into one JSON string per section, keyed as in [`Section::key`].
    pub fn to_fields(&self) -> serde_json::Result<Vec<(&'static str, String)>> {
        let mut fields = Vec::with_capacity(Section::ALL.len() + 1);

        for section in Section::ALL {
            fields.push((section.key(), self.section_value(section)?.to_string()));
        }
        fields.push((UPDATED_AT_KEY, serde_json::to_string(&self.updated_at)?));

        Ok(fields)
    }

    /// Inverse of [`SiteConfig::to_fields`]; missing sections take their defaults.
    pub fn from_fields(fields: &HashMap<String, String>) -> serde_json::Result<Self> {
        let mut document = Map::new();

        for (key, raw) in fields {
            document.insert(key.clone(), serde_json::from_str(raw)?);
        }

        serde_json::from_value(Value::Object(document))
    }
}
