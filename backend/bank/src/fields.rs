//! # Form Fields
//!
//! Descriptors behind the public registration form. The admin dashboard edits
//! them as an [`OrderedList`], the public page renders the visible ones in
//! `order`, and the validator checks submissions against them.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::SchemaError,
    ordered::{Ordered, OrderedList},
};

pub type FormSchema = OrderedList<FieldDescriptor>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Email,
    Tel,
    Url,
    Textarea,
    Select,
    Radio,
    Checkbox,
    Number,
    Date,
}

impl FieldType {
    pub fn requires_options(self) -> bool {
        matches!(self, Self::Select | Self::Radio | Self::Checkbox)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub order: u32,
    #[serde(default = "visible_by_default")]
    pub visible: bool,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Opaque rule bag, stored and returned untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub validation: Map<String, Value>,
}

fn visible_by_default() -> bool {
    true
}

impl FieldDescriptor {
    pub fn new(name: &str, label: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            field_type,
            placeholder: None,
            required: false,
            order: 0,
            visible: true,
            options: Vec::new(),
            description: None,
            warning: None,
            validation: Map::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn options(mut self, options: &[&str]) -> Self {
        self.options = options.iter().map(|o| o.to_string()).collect();
        self
    }
}

impl Ordered for FieldDescriptor {
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

    fn key(&self) -> Option<&str> {
        Some(&self.name)
    }

    fn check(&self) -> Result<(), SchemaError> {
        if self.name.trim().is_empty() {
            return Err(SchemaError::EmptyName);
        }

        if self.field_type.requires_options() && self.options.is_empty() {
            return Err(SchemaError::MissingOptions(self.name.clone()));
        }

        Ok(())
    }
}

/// The standard bootcamp registration form.
pub fn default_form() -> FormSchema {
    use FieldType::*;

    let fields = [
        FieldDescriptor::new("name", "Full Name", Text)
            .placeholder("Enter your full name")
            .required(),
        FieldDescriptor::new("email", "Email Address", Email)
            .placeholder("your.email@example.com")
            .required(),
        FieldDescriptor::new("phone", "Phone Number", Tel)
            .placeholder("+91 1234567890")
            .required(),
        FieldDescriptor::new("college", "College Name", Text)
            .placeholder("Your college name")
            .required(),
        FieldDescriptor::new("year", "Year", Select)
            .options(&["1st Year", "2nd Year", "3rd Year", "4th Year"])
            .required(),
        FieldDescriptor::new("branch", "Branch/Department", Text)
            .placeholder("Computer Science")
            .required(),
        FieldDescriptor::new("experience", "Experience Level", Select)
            .options(&["Beginner", "Intermediate", "Advanced"])
            .required(),
        FieldDescriptor::new("github", "GitHub Profile", Url)
            .placeholder("https://github.com/username"),
        FieldDescriptor::new("linkedin", "LinkedIn Profile", Url)
            .placeholder("https://linkedin.com/in/username"),
        FieldDescriptor::new("expectations", "What do you expect from this bootcamp?", Textarea)
            .placeholder("Share your expectations..."),
    ];

    let mut form = FormSchema::default();
    for field in fields {
        let added = form.add(field);
        debug_assert!(added.is_ok(), "default field rejected: {added:?}");
    }

    form
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_form_is_contiguous() {
        let form = default_form();

        assert_eq!(form.len(), 10);
        for (i, field) in form.as_slice().iter().enumerate() {
            assert_eq!(field.order, i as u32);
            assert!(field.visible);
        }
        assert!(form.contains_key("expectations"));
    }

    #[test]
    fn choice_fields_need_options() {
        let mut form = FormSchema::default();
        let err = form
            .add(FieldDescriptor::new("track", "Track", FieldType::Radio))
            .unwrap_err();

        assert_eq!(err, SchemaError::MissingOptions("track".to_string()));

        form.add(FieldDescriptor::new("track", "Track", FieldType::Radio).options(&["web"]))
            .unwrap();
        assert_eq!(form.len(), 1);
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut form = FormSchema::default();
        assert_eq!(
            form.add(FieldDescriptor::new("  ", "Nothing", FieldType::Text)),
            Err(SchemaError::EmptyName)
        );
    }

    #[test]
    fn deserializes_with_defaults() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "name": "email",
            "label": "Email",
            "type": "email",
            "required": true,
            "order": 0
        }))
        .unwrap();

        assert_eq!(field.field_type, FieldType::Email);
        assert!(field.visible);
        assert!(field.options.is_empty());
    }

    #[test]
    fn schema_deserialization_checks_consistency() {
        let gap = json!([
            { "name": "a", "label": "A", "type": "text", "order": 0 },
            { "name": "b", "label": "B", "type": "text", "order": 3 }
        ]);
        assert!(serde_json::from_value::<FormSchema>(gap).is_err());

        let unknown_type = json!([{ "name": "a", "label": "A", "type": "color", "order": 0 }]);
        assert!(serde_json::from_value::<FormSchema>(unknown_type).is_err());
    }
}
