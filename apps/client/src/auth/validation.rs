//! Client-side checks for the auth forms: email format, password strength
//! and the per-field rules run before anything is sent.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const NAME_MIN_LENGTH: usize = 2;
/// Register submissions below this score are blocked.
pub const MIN_PASSWORD_SCORE: u8 = 40;
const POINTS_PER_CHECK: u8 = 20;

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid email regex"))
}

pub fn is_valid_email(email: &str) -> bool {
    email_regex().is_match(email)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordChecks {
    pub length: bool,
    pub lowercase: bool,
    pub uppercase: bool,
    pub number: bool,
    pub special: bool,
}

impl PasswordChecks {
    pub fn of(password: &str) -> Self {
        Self {
            length: password.chars().count() >= PASSWORD_MIN_LENGTH,
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            number: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| !c.is_ascii_alphanumeric()),
        }
    }

    pub fn satisfied(&self) -> u8 {
        [
            self.length,
            self.lowercase,
            self.uppercase,
            self.number,
            self.special,
        ]
        .iter()
        .filter(|met| **met)
        .count() as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    /// 0..=100 in steps of 20.
    pub score: u8,
    pub label: &'static str,
    /// Bootstrap contextual color.
    pub color: &'static str,
}

pub fn calculate_password_strength(password: &str) -> PasswordStrength {
    let satisfied = PasswordChecks::of(password).satisfied();
    let (label, color) = match satisfied {
        0 | 1 => ("Very Weak", "danger"),
        2 => ("Weak", "warning"),
        3 => ("Fair", "warning"),
        4 => ("Good", "info"),
        _ => ("Strong", "success"),
    };
    PasswordStrength {
        score: satisfied * POINTS_PER_CHECK,
        label,
        color,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirement {
    /// Id of the checklist element in the register form.
    pub id: &'static str,
    pub met: bool,
}

pub fn password_requirements(password: &str) -> [Requirement; 5] {
    let checks = PasswordChecks::of(password);
    [
        Requirement { id: "req-length", met: checks.length },
        Requirement { id: "req-lowercase", met: checks.lowercase },
        Requirement { id: "req-uppercase", met: checks.uppercase },
        Requirement { id: "req-number", met: checks.number },
        Requirement { id: "req-special", met: checks.special },
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    ConfirmPassword,
    Checkbox,
}

/// One input of an auth form. `name` doubles as the element id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl Field {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    /// Id of the element that shows this field's error message.
    pub fn error_id(&self) -> String {
        format!("{}-error", self.name)
    }
}

/// Submitted form values, keyed by field name. A checked checkbox is present
/// with value `"on"`; an unchecked one is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: &str) {
        self.values.insert(name.to_string(), value.to_string());
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_checked(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.values
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

/// Runs the rules for one field. `enforce_strength` is set for registration,
/// where a weak password blocks the submit.
pub fn validate_field(
    field: &Field,
    form: &FormValues,
    enforce_strength: bool,
) -> Result<(), String> {
    if field.kind == FieldKind::Checkbox {
        if field.required && !form.is_checked(field.name) {
            return Err("You must accept the terms to continue".to_string());
        }
        return Ok(());
    }

    let raw = form.get(field.name);
    let value = raw.trim();

    if field.required && value.is_empty() {
        return Err("This field is required".to_string());
    }
    if value.is_empty() {
        return Ok(());
    }

    match field.kind {
        FieldKind::Email if !is_valid_email(value) => {
            Err("Please enter a valid email address".to_string())
        }
        FieldKind::Text if value.chars().count() < NAME_MIN_LENGTH => {
            Err("Name must be at least 2 characters long".to_string())
        }
        FieldKind::Password if enforce_strength => {
            if raw.chars().count() < PASSWORD_MIN_LENGTH {
                Err("Password must be at least 8 characters long".to_string())
            } else if calculate_password_strength(raw).score < MIN_PASSWORD_SCORE {
                Err("Password is too weak".to_string())
            } else {
                Ok(())
            }
        }
        FieldKind::ConfirmPassword if raw != form.get("password") => {
            Err("Passwords do not match".to_string())
        }
        _ => Ok(()),
    }
}
