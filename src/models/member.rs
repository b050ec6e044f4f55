//! Member record and the explicit update set applied to it.

use serde::{Deserialize, Serialize};

/// A club member as stored in the `members` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub email: String,
    /// BOS number; never `Some("")`
    pub bos: Option<String>,
    pub paid: bool,
}

/// A validated member that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMember {
    pub name: String,
    pub email: String,
    pub bos: Option<String>,
    pub paid: bool,
}

/// Field-by-field changes to an existing member. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub bos: Option<Option<String>>,
    pub paid: Option<bool>,
}

impl MemberChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.bos.is_none() && self.paid.is_none()
    }
}

impl From<NewMember> for MemberChanges {
    /// Replace every field, as an edit form submission does.
    fn from(member: NewMember) -> Self {
        Self {
            name: Some(member.name),
            email: Some(member.email),
            bos: Some(member.bos),
            paid: Some(member.paid),
        }
    }
}

impl Member {
    /// Apply `changes` in place.
    pub fn apply(&mut self, changes: &MemberChanges) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(email) = &changes.email {
            self.email = email.clone();
        }
        if let Some(bos) = &changes.bos {
            self.bos = empty_to_none(bos.clone());
        }
        if let Some(paid) = changes.paid {
            self.paid = paid;
        }
    }

    /// Changes that bring this record into canonical form, or `None` if it already is.
    ///
    /// Names are title-cased; an empty BOS number becomes absent and a leading
    /// lowercase `c` is capitalized. Applying the result and calling this again
    /// yields `None`.
    pub fn normalization(&self) -> Option<MemberChanges> {
        let mut changes = MemberChanges::default();

        let name = title_case(&self.name);
        if name != self.name {
            changes.name = Some(name);
        }

        let bos = normalize_bos(self.bos.as_deref());
        if bos != self.bos {
            changes.bos = Some(bos);
        }

        (!changes.is_empty()).then_some(changes)
    }
}

/// Summary counts shown alongside the member list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberCounts {
    pub all: i64,
    pub bos: i64,
    pub paid: i64,
}

/// Map an empty BOS number to absent.
pub fn empty_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Canonical BOS number: absent when empty, leading `c` upper-cased.
pub fn normalize_bos(bos: Option<&str>) -> Option<String> {
    let bos = bos.filter(|s| !s.is_empty())?;
    match bos.strip_prefix('c') {
        Some(rest) => Some(format!("C{}", rest)),
        None => Some(bos.to_string()),
    }
}

/// Upper-case the first letter of every word and lower-case the rest.
///
/// A word is a run of alphabetic characters, so `o'neil-smith` becomes
/// `O'Neil-Smith`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut in_word = false;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if in_word {
                out.extend(ch.to_lowercase());
            } else {
                // `ß` upper-cases to `SS`; keep one capital so a second pass is stable
                let mut upper = ch.to_uppercase();
                out.extend(upper.next());
                out.extend(upper.flat_map(char::to_lowercase));
            }
            in_word = true;
        } else {
            out.push(ch);
            in_word = false;
        }
    }
    out
}
