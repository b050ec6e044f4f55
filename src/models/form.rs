//! Signup/edit form fields as submitted by the browser.

use serde::{Deserialize, Deserializer, Serialize};

use super::Member;

/// Raw, untrusted form input. Also the shape echoed back when the form is redisplayed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub bos: String,
    #[serde(default, deserialize_with = "checkbox")]
    pub paid: bool,
}

impl MemberForm {
    /// An empty form with the email field pre-filled with the club's domain suffix.
    pub fn blank(email_domain: &str) -> Self {
        Self {
            email: email_domain.to_string(),
            ..Default::default()
        }
    }
}

impl From<&Member> for MemberForm {
    fn from(member: &Member) -> Self {
        Self {
            name: member.name.clone(),
            email: member.email.clone(),
            bos: member.bos.clone().unwrap_or_default(),
            paid: member.paid,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CheckboxValue {
    Flag(bool),
    Text(String),
}

/// HTML checkboxes are absent when unticked and carry an arbitrary value when ticked.
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match CheckboxValue::deserialize(deserializer)? {
        CheckboxValue::Flag(flag) => flag,
        CheckboxValue::Text(text) => !matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "0" | "off" | "n" | "no"
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_form_prefills_domain() {
        let form = MemberForm::blank("@aber.ac.uk");
        assert_eq!(form.email, "@aber.ac.uk");
        assert!(form.name.is_empty());
        assert!(!form.paid);
    }

    #[test]
    fn test_checkbox_from_json() {
        let form: MemberForm =
            serde_json::from_str(r#"{"name":"A","email":"a@b.cd","paid":"y"}"#).unwrap();
        assert!(form.paid);
        assert!(form.bos.is_empty());

        let form: MemberForm = serde_json::from_str(r#"{"paid":false}"#).unwrap();
        assert!(!form.paid);

        let form: MemberForm = serde_json::from_str(r#"{"paid":"false"}"#).unwrap();
        assert!(!form.paid);

        let form: MemberForm = serde_json::from_str(r#"{}"#).unwrap();
        assert!(!form.paid);
    }

    #[test]
    fn test_form_from_member() {
        let member = Member {
            id: 4,
            name: "Frank".into(),
            email: "frank@aber.ac.uk".into(),
            bos: None,
            paid: true,
        };
        let form = MemberForm::from(&member);
        assert_eq!(form.bos, "");
        assert!(form.paid);
    }
}
