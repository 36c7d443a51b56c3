use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::from_str;
use std::io;
use time_humanize::{Accuracy, HumanTime, Tense};

use crate::assets::asset_str;
use crate::error::PosError;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StaffRole {
    Cashier,
    Warehouse,
    Manager,
    Admin,
}

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum_macros::Display, Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum StaffStatus {
    #[default]
    Active,
    Pending,
    Inactive,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffMember {
    pub id: u32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: StaffRole,
    pub department: String,
    pub status: StaffStatus,
    pub join_date: String,
    pub last_active: String,
}

/// An application waiting for approval; approving turns it into a roster
/// entry, rejecting drops it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applicant {
    pub id: u32,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: StaffRole,
    pub department: String,
    pub applied_date: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewStaffMember {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub role: StaffRole,
    pub department: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct StaffStats {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub inactive: usize,
}

#[derive(Deserialize)]
struct StaffFile {
    roster: Vec<StaffMember>,
    pending: Vec<Applicant>,
}

/// In-memory staff directory, seeded from the embedded sample data.
#[derive(Clone, Debug)]
pub struct StaffDirectory {
    roster: Vec<StaffMember>,
    pending: Vec<Applicant>,
    next_id: u32,
}

impl StaffDirectory {
    pub fn seeded() -> Self {
        let file: StaffFile =
            from_str(asset_str("staff.json")).expect("unable to deserialize staff seed data");
        let next_id = file
            .roster
            .iter()
            .map(|s| s.id)
            .chain(file.pending.iter().map(|a| a.id))
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            roster: file.roster,
            pending: file.pending,
            next_id,
        }
    }

    pub fn roster(&self) -> &[StaffMember] {
        &self.roster
    }

    pub fn pending(&self) -> &[Applicant] {
        &self.pending
    }

    pub fn get(&self, id: u32) -> Option<&StaffMember> {
        self.roster.iter().find(|s| s.id == id)
    }

    pub fn stats(&self) -> StaffStats {
        StaffStats {
            total: self.roster.len(),
            active: self
                .roster
                .iter()
                .filter(|s| s.status == StaffStatus::Active)
                .count(),
            pending: self.pending.len(),
            inactive: self
                .roster
                .iter()
                .filter(|s| s.status == StaffStatus::Inactive)
                .count(),
        }
    }

    /// Case-insensitive match over name, email and role.
    pub fn search(&self, term: &str) -> Vec<&StaffMember> {
        let term = term.to_lowercase();
        self.roster
            .iter()
            .filter(|s| {
                s.full_name.to_lowercase().contains(&term)
                    || s.email.to_lowercase().contains(&term)
                    || s.role.to_string().contains(&term)
            })
            .collect()
    }

    /// Adds a new active member; duplicate email addresses are rejected.
    pub fn add(&mut self, new: NewStaffMember) -> Result<u32, PosError> {
        if self
            .roster
            .iter()
            .any(|s| s.email.eq_ignore_ascii_case(&new.email))
        {
            return Err(PosError::DuplicateEmail);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.roster.push(StaffMember {
            id,
            full_name: new.full_name,
            email: new.email,
            phone: new.phone,
            role: new.role,
            department: new.department,
            status: StaffStatus::Active,
            join_date: today(),
            last_active: now_iso(),
        });
        Ok(id)
    }

    pub fn change_role(&mut self, id: u32, role: StaffRole) -> bool {
        match self.roster.iter_mut().find(|s| s.id == id) {
            Some(member) => {
                member.role = role;
                true
            }
            None => false,
        }
    }

    pub fn activate(&mut self, id: u32) -> bool {
        match self.roster.iter_mut().find(|s| s.id == id) {
            Some(member) => {
                member.status = StaffStatus::Active;
                member.last_active = now_iso();
                true
            }
            None => false,
        }
    }

    pub fn deactivate(&mut self, id: u32) -> bool {
        match self.roster.iter_mut().find(|s| s.id == id) {
            Some(member) => {
                member.status = StaffStatus::Inactive;
                true
            }
            None => false,
        }
    }

    /// Moves an applicant to the active roster; join date becomes today.
    /// Returns the new member's name.
    pub fn approve(&mut self, id: u32) -> Option<String> {
        let position = self.pending.iter().position(|a| a.id == id)?;
        let applicant = self.pending.remove(position);
        let name = applicant.full_name.clone();
        self.roster.push(StaffMember {
            id: applicant.id,
            full_name: applicant.full_name,
            email: applicant.email,
            phone: applicant.phone,
            role: applicant.role,
            department: applicant.department,
            status: StaffStatus::Active,
            join_date: today(),
            last_active: now_iso(),
        });
        Some(name)
    }

    pub fn reject(&mut self, id: u32) -> Option<String> {
        let position = self.pending.iter().position(|a| a.id == id)?;
        Some(self.pending.remove(position).full_name)
    }

    /// Roster export with the header row
    /// `Name,Email,Phone,Role,Department,Status,Join Date`.
    pub fn export_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        wtr.write_record([
            "Name",
            "Email",
            "Phone",
            "Role",
            "Department",
            "Status",
            "Join Date",
        ])?;
        for member in &self.roster {
            wtr.write_record(vec![
                member.full_name.clone(),
                member.email.clone(),
                member.phone.clone(),
                member.role.to_string(),
                member.department.clone(),
                member.status.to_string(),
                member.join_date.clone(),
            ])?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// "2 hours ago" style rendering of a member's last-active timestamp.
/// Unparseable timestamps pass through unchanged.
pub fn humanize_last_active(last_active: &str, now: DateTime<Utc>) -> String {
    match DateTime::parse_from_rfc3339(last_active) {
        Ok(ts) => {
            let elapsed = (now - ts.with_timezone(&Utc)).num_seconds().max(0);
            HumanTime::from(std::time::Duration::from_secs(elapsed as u64))
                .to_text_en(Accuracy::Rough, Tense::Past)
        }
        Err(_) => last_active.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::str::FromStr;

    fn new_member(email: &str) -> NewStaffMember {
        NewStaffMember {
            full_name: "Grace Okafor".to_string(),
            email: email.to_string(),
            phone: "+234 803 900 0000".to_string(),
            role: StaffRole::Cashier,
            department: "sales".to_string(),
        }
    }

    #[test]
    fn test_seeded_directory() {
        let dir = StaffDirectory::seeded();
        assert_eq!(dir.roster().len(), 5);
        assert_eq!(dir.pending().len(), 2);
        let stats = dir.stats();
        assert_eq!(stats.total, 5);
        assert_eq!(stats.active, 4);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.inactive, 1);
    }

    #[test]
    fn test_add_rejects_duplicate_email() {
        let mut dir = StaffDirectory::seeded();
        let id = dir.add(new_member("grace.okafor@inventory.com")).unwrap();
        assert!(dir.get(id).is_some());
        assert_matches!(
            dir.add(new_member("Grace.Okafor@inventory.com")),
            Err(PosError::DuplicateEmail)
        );
    }

    #[test]
    fn test_search_matches_name_email_and_role() {
        let dir = StaffDirectory::seeded();
        assert_eq!(dir.search("mary").len(), 1);
        assert_eq!(dir.search("INVENTORY.COM").len(), 5);
        assert_eq!(dir.search("warehouse").len(), 2);
        assert!(dir.search("nobody").is_empty());
    }

    #[test]
    fn test_approve_moves_applicant_to_roster() {
        let mut dir = StaffDirectory::seeded();
        let name = dir.approve(6).unwrap();
        assert_eq!(name, "Jane Smith");
        assert_eq!(dir.pending().len(), 1);
        let member = dir.get(6).unwrap();
        assert_eq!(member.status, StaffStatus::Active);
        assert!(!member.join_date.is_empty());
    }

    #[test]
    fn test_reject_drops_applicant() {
        let mut dir = StaffDirectory::seeded();
        assert_eq!(dir.reject(7).unwrap(), "Robert Taylor");
        assert_eq!(dir.pending().len(), 1);
        assert!(dir.get(7).is_none());
        assert_eq!(dir.reject(7), None);
    }

    #[test]
    fn test_role_change_and_status_toggles() {
        let mut dir = StaffDirectory::seeded();
        assert!(dir.change_role(1, StaffRole::Manager));
        assert_eq!(dir.get(1).unwrap().role, StaffRole::Manager);

        assert!(dir.deactivate(1));
        assert_eq!(dir.get(1).unwrap().status, StaffStatus::Inactive);
        assert!(dir.activate(1));
        assert_eq!(dir.get(1).unwrap().status, StaffStatus::Active);

        assert!(!dir.change_role(99, StaffRole::Admin));
    }

    #[test]
    fn test_role_parsing_is_case_insensitive() {
        assert_eq!(StaffRole::from_str("Manager").unwrap(), StaffRole::Manager);
        assert_eq!(StaffRole::from_str("cashier").unwrap(), StaffRole::Cashier);
        assert!(StaffRole::from_str("janitor").is_err());
    }

    #[test]
    fn test_csv_export_shape() {
        let dir = StaffDirectory::seeded();
        let mut out = Vec::new();
        dir.export_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Name,Email,Phone,Role,Department,Status,Join Date"
        );
        assert_eq!(lines.count(), 5);
        assert!(text.contains("john.doe@inventory.com"));
    }

    #[test]
    fn test_humanize_last_active() {
        let now = DateTime::parse_from_rfc3339("2025-09-20T16:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let text = humanize_last_active("2025-09-20T14:30:00Z", now);
        assert!(text.contains("ago"), "got {text}");
        assert_eq!(humanize_last_active("not-a-date", now), "not-a-date");
    }
}
