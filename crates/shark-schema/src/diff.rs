//! Reconciliation: compare declared fields against a live table and plan
//! (then drive) the create/add/alter/drop statements that bring it in line.

use std::collections::{HashMap, HashSet};

use shark_core::{Backend, FieldSpec, Reconciliation, Result, TableInfo, reconcile_field};

/// One step of a reconciliation plan.
#[derive(Debug, Clone)]
pub enum Action {
    CreateTable,
    AddColumn(FieldSpec),
    AlterColumn { field: FieldSpec, reconciliation: Reconciliation },
    DropColumn(String),
}

/// Compare `declared` against `live` (`None` when the table does not
/// exist) and produce the ordered list of statements needed to reconcile
/// them. A missing table always yields a single `CreateTable` step.
#[must_use]
pub fn plan(declared: &[FieldSpec], live: Option<&HashMap<String, TableInfo>>) -> Vec<Action> {
    let Some(live_columns) = live else {
        return vec![Action::CreateTable];
    };

    let mut actions = Vec::new();
    for field in declared {
        match live_columns.get(&field.name) {
            None => actions.push(Action::AddColumn(field.clone())),
            Some(info) => {
                let reconciliation = reconcile_field(field, info);
                if !reconciliation.is_noop() {
                    actions.push(Action::AlterColumn { field: field.clone(), reconciliation });
                }
            }
        }
    }

    let declared_names: HashSet<&str> = declared.iter().map(|f| f.name.as_str()).collect();
    let mut dropped: Vec<&String> = live_columns.keys().filter(|name| !declared_names.contains(name.as_str())).collect();
    dropped.sort();
    actions.extend(dropped.into_iter().map(|name| Action::DropColumn(name.clone())));

    actions
}

/// Drive a backend through the full reconciliation of one table against
/// its declared fields: create it if absent, otherwise add/alter/drop
/// columns one at a time.
pub fn reconcile<B: Backend + ?Sized>(
    backend: &mut B,
    table: &str,
    declared: &[FieldSpec],
    primary_keys: &[String],
) -> Result<()> {
    let live = backend.get_table_info(table)?;
    for action in plan(declared, live.as_ref()) {
        match action {
            Action::CreateTable => {
                let column_defs: Vec<String> = declared.iter().map(|f| backend.generate_field(f)).collect();
                backend.create_table(table, &column_defs, primary_keys)?;
            }
            Action::AddColumn(field) => backend.alter_table_add_column(table, &field)?,
            Action::AlterColumn { field, reconciliation } => {
                backend.alter_table_column(table, &field, reconciliation.type_changed, reconciliation.nullable_changed)?;
            }
            Action::DropColumn(name) => backend.alter_table_drop_column(table, &name)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shark_core::TypeFlag;

    fn field(name: &str, type_flag: TypeFlag, nullable: bool) -> FieldSpec {
        let mut f = FieldSpec::new(name, type_flag);
        f.nullable = nullable;
        f
    }

    fn info(name: &str, type_flag: TypeFlag, nullable: bool) -> TableInfo {
        TableInfo { name: name.to_string(), type_flag, length: 0, nullable, default_value: None }
    }

    #[test]
    fn missing_table_plans_a_single_create() {
        let declared = vec![field("id", TypeFlag::INT, false)];
        let actions = plan(&declared, None);
        assert_eq!(actions.len(), 1);
        assert!(matches!(actions[0], Action::CreateTable));
    }

    #[test]
    fn matching_columns_plan_no_actions() {
        let declared = vec![field("id", TypeFlag::INT, false)];
        let mut live = HashMap::new();
        live.insert("id".to_string(), info("id", TypeFlag::INT, false));
        assert!(plan(&declared, Some(&live)).is_empty());
    }

    #[test]
    fn missing_column_plans_an_add() {
        let declared = vec![field("id", TypeFlag::INT, false), field("name", TypeFlag::STRING, true)];
        let mut live = HashMap::new();
        live.insert("id".to_string(), info("id", TypeFlag::INT, false));
        let actions = plan(&declared, Some(&live));
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::AddColumn(f) if f.name == "name"));
    }

    #[test]
    fn undeclared_live_column_plans_a_drop() {
        let declared = vec![field("id", TypeFlag::INT, false)];
        let mut live = HashMap::new();
        live.insert("id".to_string(), info("id", TypeFlag::INT, false));
        live.insert("legacy".to_string(), info("legacy", TypeFlag::STRING, true));
        let actions = plan(&declared, Some(&live));
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::DropColumn(name) if name == "legacy"));
    }

    #[test]
    fn incompatible_type_plans_an_alter() {
        let declared = vec![field("id", TypeFlag::INT, false)];
        let mut live = HashMap::new();
        live.insert("id".to_string(), info("id", TypeFlag::STRING, false));
        let actions = plan(&declared, Some(&live));
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], Action::AlterColumn { reconciliation, .. } if reconciliation.type_changed));
    }
}
