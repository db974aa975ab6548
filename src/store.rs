use crate::model::employee::Employee;
use crate::model::punch::PunchRecord;
use chrono::NaiveDate;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, derive_more::Display)]
pub enum StoreError {
    #[display(fmt = "username already taken")]
    UsernameTaken,
    #[display(fmt = "employee not found")]
    EmployeeNotFound,
}

impl std::error::Error for StoreError {}

#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub jti: String,
    pub employee_id: String,
    pub expires_at: usize,
    pub revoked: bool,
}

/// All application state. Lives in memory for the whole process lifetime;
/// the only way in or out of the process is the backup endpoint.
///
/// The version counter is bumped on every mutation and keys the report
/// cache, so stale monthly sheets are never served.
#[derive(Default)]
pub struct AppStore {
    employees: RwLock<Vec<Employee>>,
    punches: RwLock<Vec<PunchRecord>>,
    refresh_tokens: RwLock<Vec<RefreshTokenRecord>>,
    version: AtomicU64,
}

impl AppStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    // ---------- employees ----------

    pub fn insert_employee(&self, employee: Employee) -> Result<(), StoreError> {
        let mut employees = self.employees.write().expect("employee lock poisoned");
        if employees
            .iter()
            .any(|e| e.username.eq_ignore_ascii_case(&employee.username))
        {
            return Err(StoreError::UsernameTaken);
        }
        employees.push(employee);
        drop(employees);
        self.bump();
        Ok(())
    }

    pub fn get_employee(&self, id: &str) -> Option<Employee> {
        self.employees
            .read()
            .expect("employee lock poisoned")
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub fn find_by_username(&self, username: &str) -> Option<Employee> {
        self.employees
            .read()
            .expect("employee lock poisoned")
            .iter()
            .find(|e| e.username.eq_ignore_ascii_case(username))
            .cloned()
    }

    pub fn list_employees(&self) -> Vec<Employee> {
        self.employees
            .read()
            .expect("employee lock poisoned")
            .clone()
    }

    /// Apply an in-place edit to one employee. Fails if the id is unknown
    /// or the edit would steal another employee's username.
    pub fn update_employee(
        &self,
        id: &str,
        apply: impl FnOnce(&mut Employee),
    ) -> Result<Employee, StoreError> {
        let mut employees = self.employees.write().expect("employee lock poisoned");
        let index = employees
            .iter()
            .position(|e| e.id == id)
            .ok_or(StoreError::EmployeeNotFound)?;

        let mut updated = employees[index].clone();
        apply(&mut updated);

        if employees
            .iter()
            .any(|e| e.id != id && e.username.eq_ignore_ascii_case(&updated.username))
        {
            return Err(StoreError::UsernameTaken);
        }

        employees[index] = updated.clone();
        drop(employees);
        self.bump();
        Ok(updated)
    }

    /// Remove an employee and every punch that references them. Punches
    /// belong to exactly one employee, so nothing can be left dangling.
    pub fn delete_employee(&self, id: &str) -> Result<(), StoreError> {
        let mut employees = self.employees.write().expect("employee lock poisoned");
        let before = employees.len();
        employees.retain(|e| e.id != id);
        if employees.len() == before {
            return Err(StoreError::EmployeeNotFound);
        }
        drop(employees);

        self.punches
            .write()
            .expect("punch lock poisoned")
            .retain(|p| p.employee_id != id);
        self.bump();
        Ok(())
    }

    // ---------- punches ----------

    pub fn insert_punch(&self, punch: PunchRecord) -> Result<(), StoreError> {
        if self.get_employee(&punch.employee_id).is_none() {
            return Err(StoreError::EmployeeNotFound);
        }
        self.punches
            .write()
            .expect("punch lock poisoned")
            .push(punch);
        self.bump();
        Ok(())
    }

    pub fn punches_for(&self, employee_id: &str) -> Vec<PunchRecord> {
        self.punches
            .read()
            .expect("punch lock poisoned")
            .iter()
            .filter(|p| p.employee_id == employee_id)
            .cloned()
            .collect()
    }

    pub fn punches_for_day(&self, employee_id: &str, date: NaiveDate) -> Vec<PunchRecord> {
        self.punches
            .read()
            .expect("punch lock poisoned")
            .iter()
            .filter(|p| p.employee_id == employee_id && p.timestamp.date() == date)
            .cloned()
            .collect()
    }

    pub fn all_punches(&self) -> Vec<PunchRecord> {
        self.punches.read().expect("punch lock poisoned").clone()
    }

    // ---------- backup ----------

    pub fn snapshot(&self) -> (Vec<Employee>, Vec<PunchRecord>) {
        (self.list_employees(), self.all_punches())
    }

    /// Wholesale replacement of both collections, used by restore.
    pub fn replace(&self, employees: Vec<Employee>, punches: Vec<PunchRecord>) {
        *self.employees.write().expect("employee lock poisoned") = employees;
        *self.punches.write().expect("punch lock poisoned") = punches;
        self.bump();
    }

    // ---------- refresh tokens ----------

    pub fn store_refresh_token(&self, record: RefreshTokenRecord) {
        self.refresh_tokens
            .write()
            .expect("token lock poisoned")
            .push(record);
    }

    pub fn refresh_token_active(&self, jti: &str) -> bool {
        self.refresh_tokens
            .read()
            .expect("token lock poisoned")
            .iter()
            .any(|t| t.jti == jti && !t.revoked)
    }

    /// Idempotent; revoking an unknown jti is a no-op.
    pub fn revoke_refresh_token(&self, jti: &str) {
        let mut tokens = self.refresh_tokens.write().expect("token lock poisoned");
        if let Some(token) = tokens.iter_mut().find(|t| t.jti == jti) {
            token.revoked = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::punch::{PunchKind, PunchStatus};
    use crate::model::role::Role;
    use chrono::NaiveDateTime;

    fn employee(id: &str, username: &str) -> Employee {
        Employee {
            id: id.into(),
            name: "MARIA OLIVEIRA".into(),
            username: username.into(),
            company: "ULTRANET".into(),
            job_title: "SUPORTE".into(),
            shift: "08:00 - 18:00".into(),
            role: Role::Employee,
            password_hash: "hash".into(),
        }
    }

    fn punch(employee_id: &str, stamp: &str) -> PunchRecord {
        PunchRecord {
            id: uuid::Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            timestamp: NaiveDateTime::parse_from_str(stamp, "%Y-%m-%dT%H:%M:%S").unwrap(),
            kind: PunchKind::In,
            note: None,
            location: None,
            photo: None,
            status: PunchStatus::Accepted,
        }
    }

    #[test]
    fn usernames_are_unique_case_insensitively() {
        let store = AppStore::new();
        store.insert_employee(employee("e1", "maria")).unwrap();
        let err = store.insert_employee(employee("e2", "MARIA")).unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken));
    }

    #[test]
    fn punch_for_unknown_employee_is_rejected() {
        let store = AppStore::new();
        let err = store
            .insert_punch(punch("ghost", "2025-12-01T08:00:00"))
            .unwrap_err();
        assert!(matches!(err, StoreError::EmployeeNotFound));
    }

    #[test]
    fn deleting_an_employee_cascades_to_their_punches() {
        let store = AppStore::new();
        store.insert_employee(employee("e1", "maria")).unwrap();
        store.insert_employee(employee("e2", "joao")).unwrap();
        store
            .insert_punch(punch("e1", "2025-12-01T08:00:00"))
            .unwrap();
        store
            .insert_punch(punch("e2", "2025-12-01T08:05:00"))
            .unwrap();

        store.delete_employee("e1").unwrap();

        assert!(store.punches_for("e1").is_empty());
        assert_eq!(store.punches_for("e2").len(), 1);
    }

    #[test]
    fn every_mutation_bumps_the_version() {
        let store = AppStore::new();
        let v0 = store.version();
        store.insert_employee(employee("e1", "maria")).unwrap();
        let v1 = store.version();
        store
            .insert_punch(punch("e1", "2025-12-01T08:00:00"))
            .unwrap();
        let v2 = store.version();
        store.replace(Vec::new(), Vec::new());
        let v3 = store.version();

        assert!(v0 < v1 && v1 < v2 && v2 < v3);
    }

    #[test]
    fn refresh_tokens_revoke_idempotently() {
        let store = AppStore::new();
        store.store_refresh_token(RefreshTokenRecord {
            jti: "jti-1".into(),
            employee_id: "e1".into(),
            expires_at: 0,
            revoked: false,
        });
        assert!(store.refresh_token_active("jti-1"));
        store.revoke_refresh_token("jti-1");
        store.revoke_refresh_token("jti-1");
        assert!(!store.refresh_token_active("jti-1"));
        store.revoke_refresh_token("never-seen");
    }
}
