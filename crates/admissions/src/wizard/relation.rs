use tracing::debug;

use super::domain::{ContactRole, ParentSlot, Relation};
use super::store::FieldStore;

/// What a relation change did to the contact's identity fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// Copied from the parent record and locked.
    Copied(ParentSlot),
    /// Cleared and unlocked for manual entry.
    Cleared,
}

/// Apply a relation choice for the supporter or guardian.
///
/// Choosing `padre`/`madre` overwrites the role's name, email, phone and RUT with
/// the matching parent's current values and locks them; any other relation wipes
/// those fields and unlocks them. The copy is one-shot: later edits to the parent
/// record are not mirrored.
pub fn select_relation(store: &mut FieldStore, role: ContactRole, relation: Relation) -> Propagation {
    let contact = role.fields();
    store.put(contact.relation, relation.as_str());

    match relation.parent() {
        Some(slot) => {
            let parent = slot.fields();
            let pairs = [
                (contact.name, parent.name),
                (contact.email, parent.email),
                (contact.phone, parent.phone),
                (contact.rut, parent.rut),
            ];
            for (target, source) in pairs {
                let value = store.get(source).unwrap_or_default().to_string();
                store.put(target, value);
                store.lock(target);
            }
            debug!(?role, ?slot, "copied parent contact into role");
            Propagation::Copied(slot)
        }
        None => {
            for field in contact.identity() {
                store.put(field, "");
                store.unlock(field);
            }
            debug!(?role, relation = relation.as_str(), "cleared role contact");
            Propagation::Cleared
        }
    }
}
