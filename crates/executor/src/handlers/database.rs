//! Database lifecycle handlers.

use std::path::Path;

use tracing::info;

use arbor_core::DatabaseName;
use arbor_storage::parse_document;

use crate::command::database_name;
use crate::context::Context;
use crate::output::Output;
use crate::{Error, Executor, Result};

/// Handle `CreateDb`.
///
/// `input` starting with `<` is parsed as inline XML and needs an explicit
/// name. Anything else is read as a file whose stem names the database
/// unless `name` is given.
pub fn create_db(
    executor: &Executor,
    ctx: &mut Context,
    input: &str,
    name: Option<&str>,
) -> Result<String> {
    let (xml, name) = if input.trim_start().starts_with('<') {
        let name = name.ok_or_else(|| Error::validation("inline XML input needs a database name"))?;
        (input.to_string(), database_name(name)?)
    } else {
        let path = Path::new(input);
        let name = match name {
            Some(name) => database_name(name)?,
            None => default_name(path)?,
        };
        let xml = std::fs::read_to_string(path).map_err(|e| Error::Io {
            reason: format!("cannot read '{}': {}", input, e),
        })?;
        (xml, name)
    };

    let tree = parse_document(&xml, ctx.options().chop)?;
    let db = executor.store().create(&name, tree)?;
    ctx.attach(db.clone())?;
    info!(target: "arbor::db", db = %name, user = %ctx.identity().user, "created and opened");
    Ok(format!(
        "Database '{}' created with {} nodes.",
        name,
        db.size()
    ))
}

fn default_name(path: &Path) -> Result<DatabaseName> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::validation(format!("cannot derive a name from '{}'", path.display())))?;
    database_name(stem)
}

/// Handle `Open`. Reopening the current database selects its root again.
pub fn open(executor: &Executor, ctx: &mut Context, name: &DatabaseName) -> Result<String> {
    match ctx.open_database(executor.store(), name) {
        Ok(_) | Err(Error::AlreadyOpen { .. }) => {
            ctx.reset_selection();
            Ok(format!("Database '{}' opened.", name))
        }
        Err(e) => Err(e),
    }
}

/// Handle `Close`.
pub fn close(ctx: &mut Context) -> Result<String> {
    let name = ctx.database().map(|db| db.name().to_string());
    ctx.close_database();
    Ok(match name {
        Some(name) => format!("Database '{}' closed.", name),
        None => "No database was open.".to_string(),
    })
}

/// Handle `DropDb`.
pub fn drop_db(executor: &Executor, ctx: &mut Context, name: &DatabaseName) -> Result<String> {
    ctx.drop_database(executor.store(), name)?;
    Ok(format!("Database '{}' dropped.", name))
}

/// Handle `List`: one `name<TAB>size` row per database.
pub fn list(executor: &Executor, out: &mut Output<'_>) -> Result<String> {
    let rows = executor.store().list();
    for row in &rows {
        out.write(&format!("{}\t{}", row.name, row.size))?;
    }
    Ok(format!("{} database(s).", rows.len()))
}

/// Handle `InfoDb`.
pub fn info_db(ctx: &Context, out: &mut Output<'_>) -> Result<String> {
    let db = ctx.require_database()?;
    let size = db.size();
    out.write(&format!("Name: {}", db.name()))?;
    out.write(&format!("Size: {} nodes", size))?;
    out.write(&format!("Created: {}", db.created_at().to_rfc3339()))?;
    out.write(&format!("Updates: {}", db.updates()))?;
    out.write(&format!("Sessions: {}", db.pins()))?;
    Ok(format!("Database '{}' has {} nodes.", db.name(), size))
}
