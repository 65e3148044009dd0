//! Static token-to-identity directory.
//!
//! The directory is loaded once at startup from configuration and never
//! mutated afterwards. The authorized set is small and fixed, so lookup is a
//! linear scan; there is nothing to index.

use crate::types::RfidTag;

/// One authorized card holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Employee {
    /// Tag registered to this person.
    pub tag: RfidTag,

    /// Display name.
    pub name: String,
}

impl Employee {
    /// Create an employee record.
    pub fn new(tag: RfidTag, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
        }
    }
}

/// Read-only mapping from tag to identity.
///
/// # Examples
///
/// ```
/// use badgepoint_core::{Employee, EmployeeDirectory};
///
/// let tag = "04:52:F3:2A".parse().unwrap();
/// let directory = EmployeeDirectory::new(vec![Employee::new(tag, "Joao Silva")]);
///
/// let probe = "04:52:f3:2a".parse().unwrap();
/// assert_eq!(directory.resolve(&probe), Some("Joao Silva"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmployeeDirectory {
    employees: Vec<Employee>,
}

impl EmployeeDirectory {
    /// Build a directory from the configured employee list.
    #[must_use]
    pub fn new(employees: Vec<Employee>) -> Self {
        Self { employees }
    }

    /// Resolve a tag to its holder's name.
    ///
    /// Pure lookup: no side effects, same answer for the same tag every
    /// time. Tag equality is constant-time, so the scan does not leak which
    /// prefix of an unauthorized tag matched.
    #[must_use]
    pub fn resolve(&self, tag: &RfidTag) -> Option<&str> {
        self.employees
            .iter()
            .find(|e| &e.tag == tag)
            .map(|e| e.name.as_str())
    }

    /// Number of registered employees.
    #[must_use]
    pub fn len(&self) -> usize {
        self.employees.len()
    }

    /// Whether the directory is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.employees.is_empty()
    }

    /// Iterate over the registered employees.
    pub fn iter(&self) -> impl Iterator<Item = &Employee> {
        self.employees.iter()
    }
}
