use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

// ASCII digits only: 09 followed by nine more.
static CONTACT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^09[0-9]{9}$").expect("contact pattern compiles")
});

pub const NAME_REQUIRED: &str = "Name is required.";
pub const EMAIL_REQUIRED: &str = "Email is required.";
pub const EMAIL_INVALID: &str = "Please enter a valid email address.";
pub const CONTACT_REQUIRED: &str = "Contact number is required.";
pub const CONTACT_INVALID: &str =
    "Please enter a valid contact number (11 digits starting with 09).";
pub const WHY_HIRE_REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    ContactNumber,
    WhyHire,
}

impl Field {
    pub const ALL: [Field; 4] = [Field::Name, Field::Email, Field::ContactNumber, Field::WhyHire];

    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Full Name",
            Field::Email => "Email Address",
            Field::ContactNumber => "Contact Number",
            Field::WhyHire => "Why should we hire you?",
        }
    }

    pub fn next(self) -> Field {
        match self {
            Field::Name => Field::Email,
            Field::Email => Field::ContactNumber,
            Field::ContactNumber => Field::WhyHire,
            Field::WhyHire => Field::Name,
        }
    }

    pub fn prev(self) -> Field {
        match self {
            Field::Name => Field::WhyHire,
            Field::Email => Field::Name,
            Field::ContactNumber => Field::Email,
            Field::WhyHire => Field::ContactNumber,
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Field::Name => "name",
            Field::Email => "email",
            Field::ContactNumber => "contactNumber",
            Field::WhyHire => "whyHire",
        };
        f.write_str(key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicationDraft {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub why_hire: String,
}

impl ApplicationDraft {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::ContactNumber => &self.contact_number,
            Field::WhyHire => &self.why_hire,
        }
    }

    pub fn set(&mut self, field: Field, value: String) {
        match field {
            Field::Name => self.name = value,
            Field::Email => self.email = value,
            Field::ContactNumber => self.contact_number = value,
            Field::WhyHire => self.why_hire = value,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Per-field messages; an empty message means the field is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    pub name: String,
    pub email: String,
    pub contact_number: String,
    pub why_hire: String,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::ContactNumber => &self.contact_number,
            Field::WhyHire => &self.why_hire,
        }
    }

    pub fn is_valid(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub fn validate(draft: &ApplicationDraft) -> FieldErrors {
    let mut errors = FieldErrors::default();

    if draft.name.trim().is_empty() {
        errors.name = NAME_REQUIRED.to_string();
    }

    if draft.email.trim().is_empty() {
        errors.email = EMAIL_REQUIRED.to_string();
    } else if !EMAIL_PATTERN.is_match(&draft.email) {
        errors.email = EMAIL_INVALID.to_string();
    }

    if draft.contact_number.trim().is_empty() {
        errors.contact_number = CONTACT_REQUIRED.to_string();
    } else if !CONTACT_PATTERN.is_match(&draft.contact_number) {
        errors.contact_number = CONTACT_INVALID.to_string();
    }

    if draft.why_hire.trim().is_empty() {
        errors.why_hire = WHY_HIRE_REQUIRED.to_string();
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_draft() -> ApplicationDraft {
        ApplicationDraft {
            name: "Ann".to_string(),
            email: "a@b.com".to_string(),
            contact_number: "09123456789".to_string(),
            why_hire: "x".to_string(),
        }
    }

    #[test]
    fn test_empty_draft_reports_every_field() {
        let errors = validate(&ApplicationDraft::default());
        assert_eq!(errors.name, NAME_REQUIRED);
        assert_eq!(errors.email, EMAIL_REQUIRED);
        assert_eq!(errors.contact_number, CONTACT_REQUIRED);
        assert_eq!(errors.why_hire, WHY_HIRE_REQUIRED);
        assert!(!errors.is_valid());
    }

    #[test]
    fn test_valid_draft_has_no_errors() {
        let errors = validate(&valid_draft());
        assert_eq!(errors, FieldErrors::default());
        assert!(errors.is_valid());
    }

    #[test]
    fn test_whitespace_only_counts_as_empty() {
        let mut draft = valid_draft();
        draft.name = "   ".to_string();
        draft.why_hire = "\t\n".to_string();
        draft.email = "  ".to_string();
        draft.contact_number = " ".to_string();

        let errors = validate(&draft);
        assert_eq!(errors.name, NAME_REQUIRED);
        assert_eq!(errors.why_hire, WHY_HIRE_REQUIRED);
        assert_eq!(errors.email, EMAIL_REQUIRED);
        assert_eq!(errors.contact_number, CONTACT_REQUIRED);
    }

    #[test]
    fn test_contact_number_rules() {
        let mut draft = valid_draft();
        for bad in ["08123456789", "0912345678", "091234567890", "09-23456789", "0912345678a"] {
            draft.contact_number = bad.to_string();
            assert_eq!(validate(&draft).contact_number, CONTACT_INVALID, "{}", bad);
        }

        draft.contact_number = "09123456789".to_string();
        assert!(validate(&draft).contact_number.is_empty());
    }

    #[test]
    fn test_contact_number_rejects_non_ascii_digits() {
        let mut draft = valid_draft();
        draft.contact_number = "09١٢٣٤٥٦٧٨٩".to_string();
        assert_eq!(validate(&draft).contact_number, CONTACT_INVALID);
    }

    #[test]
    fn test_email_rules() {
        let mut draft = valid_draft();
        for good in ["john.doe@example.com", "a+tag@sub.domain.org", "x_y%z-w@host.io"] {
            draft.email = good.to_string();
            assert!(validate(&draft).email.is_empty(), "{}", good);
        }
        for bad in ["plainaddress", "a@b", "a@b.c", "a b@c.com", "@b.com", "a@b.c0m", " a@b.com"] {
            draft.email = bad.to_string();
            assert_eq!(validate(&draft).email, EMAIL_INVALID, "{}", bad);
        }
    }

    #[test]
    fn test_draft_field_access() {
        let mut draft = ApplicationDraft::default();
        for field in Field::ALL {
            draft.set(field, field.to_string());
        }
        assert_eq!(draft.get(Field::ContactNumber), "contactNumber");
        assert_eq!(draft.why_hire, "whyHire");

        draft.clear();
        assert_eq!(draft, ApplicationDraft::default());
    }

    #[test]
    fn test_field_cycle() {
        let mut field = Field::Name;
        for _ in 0..4 {
            field = field.next();
        }
        assert_eq!(field, Field::Name);
        assert_eq!(Field::Name.prev(), Field::WhyHire);
    }
}
