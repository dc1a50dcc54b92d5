use serde_json::json;

use crate::auth::Identity;
use crate::store::Record;

/// Field holding the owning user of a file record
pub const OWNER_FIELD: &str = "user";

fn is_admin(identity: Option<&Identity>) -> bool {
    identity.map_or(false, Identity::is_admin)
}

/// Any authenticated identity may upload
pub fn can_create(identity: Option<&Identity>) -> bool {
    identity.is_some()
}

pub fn can_update(identity: Option<&Identity>) -> bool {
    is_admin(identity)
}

pub fn can_delete(identity: Option<&Identity>) -> bool {
    is_admin(identity)
}

/// The collection is only listed in the admin UI for admins
pub fn is_hidden_from(identity: Option<&Identity>) -> bool {
    !is_admin(identity)
}

/// Set the owner to the acting identity, discarding any client-supplied value
pub fn stamp_owner(mut record: Record, identity: Option<&Identity>) -> Record {
    match identity {
        Some(identity) => {
            record.insert(OWNER_FIELD.to_string(), json!(identity.id));
        }
        None => {
            record.remove(OWNER_FIELD);
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn only_admins_update_and_delete() {
        let admin = Identity::admin("a1");
        let customer = Identity::customer("u1");

        assert!(can_update(Some(&admin)));
        assert!(can_delete(Some(&admin)));
        assert!(!can_update(Some(&customer)));
        assert!(!can_delete(Some(&customer)));
        assert!(!can_update(None));
        assert!(!can_delete(None));
    }

    #[test]
    fn create_requires_identity() {
        assert!(can_create(Some(&Identity::customer("u1"))));
        assert!(!can_create(None));
    }

    #[test]
    fn hidden_for_everyone_but_admins() {
        assert!(!is_hidden_from(Some(&Identity::admin("a1"))));
        assert!(is_hidden_from(Some(&Identity::customer("u1"))));
        assert!(is_hidden_from(None));
    }

    #[test]
    fn stamp_overrides_client_owner() {
        let stamped = stamp_owner(
            record(serde_json::json!({ "filename": "a.pdf", "user": "someone-else" })),
            Some(&Identity::customer("u1")),
        );
        assert_eq!(stamped["user"], serde_json::json!("u1"));
        assert_eq!(stamped["filename"], serde_json::json!("a.pdf"));

        let anonymous = stamp_owner(record(serde_json::json!({ "user": "spoof" })), None);
        assert!(!anonymous.contains_key("user"));
    }
}
