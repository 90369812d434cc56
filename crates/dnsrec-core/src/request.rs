//! Validated requests for the reconciliation engine

use crate::error::{Error, Result};
use crate::record::Record;
use std::fmt;
use std::str::FromStr;

/// Supported commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    List,
    Add,
    Remove,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Add => "add",
            Operation::Remove => "remove",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "list" => Ok(Operation::List),
            "add" => Ok(Operation::Add),
            "remove" => Ok(Operation::Remove),
            other => Err(Error::validation(format!(
                "invalid command: '{}'. Use add, remove, or list",
                other
            ))),
        }
    }
}

/// A request the engine can execute
///
/// Only [`Request::new`] builds mutations, so a `Request::Add` or
/// `Request::Remove` always carries a record with all three fields set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Fetch and report the current configuration
    List,
    /// Ensure the record is present
    Add(Record),
    /// Ensure no copy of the record is present
    Remove(Record),
}

impl Request {
    /// Build a request from an operation and a candidate target
    ///
    /// The target is ignored for [`Operation::List`]. For mutations the
    /// fields are trimmed, since providers hand values back without
    /// surrounding whitespace, and every empty field is reported in a single
    /// validation error.
    pub fn new(operation: Operation, target: Record) -> Result<Self> {
        let build: fn(Record) -> Request = match operation {
            Operation::List => return Ok(Request::List),
            Operation::Add => Request::Add,
            Operation::Remove => Request::Remove,
        };

        let target = Record::new(
            target.kind.trim(),
            target.prefix.trim(),
            target.value.trim(),
        );

        let missing: Vec<&str> = [
            ("type", target.kind.is_empty()),
            ("prefix", target.prefix.is_empty()),
            ("value", target.value.is_empty()),
        ]
        .into_iter()
        .filter_map(|(field, empty)| empty.then_some(field))
        .collect();

        if !missing.is_empty() {
            return Err(Error::validation(format!(
                "{} {} required for {} command",
                missing.join(", "),
                if missing.len() == 1 { "is" } else { "are" },
                operation
            )));
        }

        Ok(build(target))
    }

    pub fn operation(&self) -> Operation {
        match self {
            Request::List => Operation::List,
            Request::Add(_) => Operation::Add,
            Request::Remove(_) => Operation::Remove,
        }
    }

    pub fn target(&self) -> Option<&Record> {
        match self {
            Request::List => None,
            Request::Add(record) | Request::Remove(record) => Some(record),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_operation() {
        assert_eq!("list".parse::<Operation>().unwrap(), Operation::List);
        assert_eq!("add".parse::<Operation>().unwrap(), Operation::Add);
        assert_eq!("remove".parse::<Operation>().unwrap(), Operation::Remove);

        let err = "delete".parse::<Operation>().unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("'delete'"));
        // Case-sensitive, like the flag values documented in --help
        assert!("LIST".parse::<Operation>().is_err());
    }

    #[test]
    fn test_list_ignores_target() {
        let request = Request::new(Operation::List, Record::new("TXT", "", "")).unwrap();
        assert_eq!(request, Request::List);
        assert!(request.target().is_none());
    }

    #[test]
    fn test_mutation_requires_complete_target() {
        let record = Record::new("TXT", "@", "v=spf1 -all");
        let request = Request::new(Operation::Add, record.clone()).unwrap();
        assert_eq!(request, Request::Add(record.clone()));
        assert_eq!(request.operation(), Operation::Add);
        assert_eq!(request.target(), Some(&record));

        let err = Request::new(Operation::Remove, Record::new("TXT", "", "x")).unwrap_err();
        assert_eq!(
            err,
            Error::validation("prefix is required for remove command")
        );

        let err = Request::new(Operation::Add, Record::new("", "@", "")).unwrap_err();
        assert_eq!(err, Error::validation("type, value are required for add command"));
    }

    #[test]
    fn test_mutation_target_is_trimmed() {
        let request =
            Request::new(Operation::Add, Record::new(" TXT", "@ ", "v=spf1 -all \n")).unwrap();
        assert_eq!(request.target(), Some(&Record::new("TXT", "@", "v=spf1 -all")));

        // Whitespace alone counts as missing
        let err = Request::new(Operation::Remove, Record::new("TXT", "@", "   ")).unwrap_err();
        assert_eq!(err, Error::validation("value is required for remove command"));
    }
}
