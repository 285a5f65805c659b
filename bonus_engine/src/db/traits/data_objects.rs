use crate::db_types::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrderResult {
    /// The order was new. The internal id of the order record is returned.
    Inserted(i64),
    /// The order number had already been submitted by the given user.
    AlreadyExists { owner: UserId },
}
