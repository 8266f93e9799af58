use crate::error::{Result, StoreError};
use crate::rows::{self, FAMILY_COLUMNS, PROFESSIONAL_COLUMNS};
use crate::sqlite_store::SqliteStore;
use infocare_core::{FamilyMember, FamilyMemberUpdate, NewFamilyMember, NewProfessional, Professional};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, OptionalExtension};

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[allow(clippy::result_large_err)]
impl SqliteStore {
    pub fn insert_family_member(&self, new: &NewFamilyMember) -> Result<FamilyMember> {
        let conn = self.conn()?;
        let email = new.email.trim().to_lowercase();
        let phone = non_empty(&new.phone);
        conn.execute(
            "INSERT INTO family_members (name, cpf, email, phone) VALUES (?, ?, ?, ?)",
            params![new.name.trim(), new.cpf, email, phone],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(family_member_id = id, "Family member stored");

        Ok(FamilyMember {
            id,
            name: new.name.trim().to_string(),
            cpf: new.cpf.clone(),
            email,
            phone: phone.map(str::to_string),
        })
    }

    pub fn get_family_member(&self, id: i64) -> Result<Option<FamilyMember>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM family_members f WHERE f.id = ?", FAMILY_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], |row| rows::family_member(row, 0))
            .optional()?)
    }

    pub fn list_family_members(&self) -> Result<Vec<FamilyMember>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM family_members f ORDER BY f.name, f.id", FAMILY_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let members = stmt
            .query_map([], |row| rows::family_member(row, 0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(members)
    }

    /// Apply a partial profile update. An empty phone clears the stored one.
    pub fn update_family_member(&self, id: i64, update: &FamilyMemberUpdate) -> Result<FamilyMember> {
        let mut sets = Vec::new();
        let mut values: Vec<Value> = Vec::new();

        if let Some(ref name) = update.name {
            sets.push("name = ?");
            values.push(Value::Text(name.trim().to_string()));
        }
        if let Some(ref email) = update.email {
            sets.push("email = ?");
            values.push(Value::Text(email.trim().to_lowercase()));
        }
        if let Some(ref phone) = update.phone {
            sets.push("phone = ?");
            values.push(match phone.trim() {
                "" => Value::Null,
                p => Value::Text(p.to_string()),
            });
        }

        if !sets.is_empty() {
            let conn = self.conn()?;
            values.push(Value::Integer(id));
            let sql = format!("UPDATE family_members SET {} WHERE id = ?", sets.join(", "));
            let rows = conn.execute(&sql, params_from_iter(values))?;
            if rows == 0 {
                return Err(StoreError::NotFound { entity: "Family member", id });
            }
        }

        self.get_family_member(id)?
            .ok_or(StoreError::NotFound { entity: "Family member", id })
    }

    /// Remove a family member; their associations go with them
    pub fn delete_family_member(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM family_members WHERE id = ?", params![id])?;
        if rows == 0 {
            return Err(StoreError::NotFound { entity: "Family member", id });
        }
        Ok(())
    }

    pub fn insert_professional(&self, new: &NewProfessional) -> Result<Professional> {
        let conn = self.conn()?;
        let email = new.email.trim().to_lowercase();
        conn.execute(
            "INSERT INTO professionals (name, cpf, email, phone, crm, coren, specialty, kind)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                new.name.trim(),
                new.cpf,
                email,
                non_empty(&new.phone),
                non_empty(&new.crm),
                non_empty(&new.coren),
                non_empty(&new.specialty),
                new.kind.as_str(),
            ],
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(professional_id = id, kind = %new.kind, "Professional stored");

        Ok(Professional {
            id,
            name: new.name.trim().to_string(),
            cpf: new.cpf.clone(),
            email,
            phone: non_empty(&new.phone).map(str::to_string),
            crm: non_empty(&new.crm).map(str::to_string),
            coren: non_empty(&new.coren).map(str::to_string),
            specialty: non_empty(&new.specialty).map(str::to_string),
            kind: new.kind,
        })
    }

    pub fn get_professional(&self, id: i64) -> Result<Option<Professional>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM professionals pr WHERE pr.id = ?", PROFESSIONAL_COLUMNS);
        Ok(conn
            .query_row(&sql, params![id], |row| rows::professional(row, 0))
            .optional()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{new_family_member, new_professional};
    use infocare_core::ProfessionalKind;

    #[test]
    fn test_family_member_roundtrip() {
        let store = SqliteStore::open(":memory:").unwrap();
        let mut new = new_family_member(1);
        new.email = "  Ana@Example.com ".to_string();
        let member = store.insert_family_member(&new).unwrap();
        assert_eq!(member.email, "ana@example.com");

        let loaded = store.get_family_member(member.id).unwrap().unwrap();
        assert_eq!(loaded, member);
    }

    #[test]
    fn test_family_member_unique_email_and_cpf() {
        let store = SqliteStore::open(":memory:").unwrap();
        store.insert_family_member(&new_family_member(1)).unwrap();

        let mut same_email = new_family_member(2);
        same_email.email = new_family_member(1).email;
        assert!(matches!(
            store.insert_family_member(&same_email).unwrap_err(),
            StoreError::UniqueViolation(_)
        ));

        let mut same_cpf = new_family_member(3);
        same_cpf.cpf = new_family_member(1).cpf;
        assert!(matches!(
            store.insert_family_member(&same_cpf).unwrap_err(),
            StoreError::UniqueViolation(_)
        ));
    }

    #[test]
    fn test_family_member_partial_update() {
        let store = SqliteStore::open(":memory:").unwrap();
        let mut new = new_family_member(1);
        new.phone = Some("+5516999998888".to_string());
        let member = store.insert_family_member(&new).unwrap();

        let update = FamilyMemberUpdate {
            name: Some("Ana Lima".to_string()),
            email: None,
            phone: Some(String::new()),
        };
        let updated = store.update_family_member(member.id, &update).unwrap();
        assert_eq!(updated.name, "Ana Lima");
        assert_eq!(updated.email, member.email);
        assert!(updated.phone.is_none());

        assert!(matches!(
            store.update_family_member(404, &update).unwrap_err(),
            StoreError::NotFound { .. }
        ));
    }

    #[test]
    fn test_delete_family_member() {
        let store = SqliteStore::open(":memory:").unwrap();
        let member = store.insert_family_member(&new_family_member(1)).unwrap();
        store.delete_family_member(member.id).unwrap();
        assert!(store.get_family_member(member.id).unwrap().is_none());
        assert!(store.delete_family_member(member.id).is_err());
    }

    #[test]
    fn test_professional_blank_fields_stored_as_null() {
        let store = SqliteStore::open(":memory:").unwrap();
        let mut new = new_professional(1);
        new.crm = Some("  ".to_string());
        new.kind = ProfessionalKind::Enfermeiro;
        let professional = store.insert_professional(&new).unwrap();

        let loaded = store.get_professional(professional.id).unwrap().unwrap();
        assert_eq!(loaded.crm, None);
        assert_eq!(loaded.kind, ProfessionalKind::Enfermeiro);
        assert_eq!(loaded, professional);
    }
}
