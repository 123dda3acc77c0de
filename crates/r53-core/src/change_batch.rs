// # Change Batches
//
// Route 53 applies the changes of one batch in submission order, as a
// single transaction. A replace is therefore always DELETE(old) followed
// by CREATE(new): the other order collides on (name, type) and the whole
// batch is rejected.
//
// ## Usage
//
// ```rust
// use r53_core::change_batch::{ChangeAction, ChangeBatchBuilder};
// use r53_core::record::{RecordType, ResourceRecord};
//
// let old = ResourceRecord::new("foo.example.com", RecordType::A, 300, ["1.2.3.4"]);
// let new = ResourceRecord::new("foo.example.com", RecordType::A, 300, ["5.6.7.8"]);
//
// let batch = ChangeBatchBuilder::build_replace(old, new);
// assert_eq!(batch.changes()[0].action, ChangeAction::Delete);
// assert_eq!(batch.changes()[1].action, ChangeAction::Create);
// ```

use crate::record::ResourceRecord;
use serde::Serialize;
use std::fmt;

/// Action applied to one record set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Delete,
}

impl ChangeAction {
    /// Wire name as Route 53 spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::Create => "CREATE",
            ChangeAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line item of a change batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeOperation {
    pub action: ChangeAction,
    pub record: ResourceRecord,
}

/// Ordered list of change operations submitted as one request
///
/// Batches can only be built through [`ChangeBatchBuilder`], which fixes
/// the order of their operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeBatch {
    comment: Option<String>,
    changes: Vec<ChangeOperation>,
}

impl ChangeBatch {
    /// Operations in submission order
    pub fn changes(&self) -> &[ChangeOperation] {
        &self.changes
    }

    /// Optional comment attached to the batch
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Attach a comment (Route 53 echoes it back in the change info)
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Validate every record in the batch
    pub fn validate(&self) -> crate::Result<()> {
        self.changes.iter().try_for_each(|op| op.record.validate())
    }
}

/// Turns create and replace intents into ordered change batches
pub struct ChangeBatchBuilder;

impl ChangeBatchBuilder {
    /// A batch creating `record`
    pub fn build_create(record: ResourceRecord) -> ChangeBatch {
        ChangeBatch {
            comment: None,
            changes: vec![ChangeOperation {
                action: ChangeAction::Create,
                record,
            }],
        }
    }

    /// A batch replacing `old_record` with `new_record`
    ///
    /// The DELETE always comes first.
    pub fn build_replace(old_record: ResourceRecord, new_record: ResourceRecord) -> ChangeBatch {
        ChangeBatch {
            comment: None,
            changes: vec![
                ChangeOperation {
                    action: ChangeAction::Delete,
                    record: old_record,
                },
                ChangeOperation {
                    action: ChangeAction::Create,
                    record: new_record,
                },
            ],
        }
    }
}
