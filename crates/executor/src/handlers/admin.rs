//! Session, option and administration handlers.

use tracing::info;

use crate::command::{OptionValue, SetOption};
use crate::context::Context;
use crate::output::Output;
use crate::{Executor, Result};

/// Handle `Info`.
pub fn info(executor: &Executor, ctx: &Context, out: &mut Output<'_>) -> Result<String> {
    let sessions = executor.registry().len();
    let options = ctx.options();
    out.write(&format!("User: {}", ctx.identity().user))?;
    out.write(&format!("Permission: {}", ctx.identity().permission))?;
    out.write(&format!(
        "Database: {}",
        ctx.database().map(|db| db.name()).unwrap_or("-")
    ))?;
    out.write(&format!("Databases: {}", executor.store().len()))?;
    out.write(&format!("Sessions: {}", sessions))?;
    out.write(&format!("INFO: {}", on_off(options.info)))?;
    out.write(&format!("CHOP: {}", on_off(options.chop)))?;
    out.write(&format!("RUNS: {}", options.runs))?;
    Ok(format!("{} session(s) active.", sessions))
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

/// Handle `Set`.
pub fn set(ctx: &mut Context, option: SetOption, value: &str) -> Result<String> {
    let options = ctx.options_mut();
    let shown = match option.parse_value(value)? {
        OptionValue::Flag(flag) => {
            match option {
                SetOption::Info => options.info = flag,
                SetOption::Chop => options.chop = flag,
                SetOption::Runs => {}
            }
            on_off(flag).to_string()
        }
        OptionValue::Count(n) => {
            options.runs = n;
            n.to_string()
        }
    };
    Ok(format!("{} set to {}.", option.as_str(), shown))
}

/// Handle `Kill`: terminate every registered session, the issuer included.
///
/// The issuing session finishes this command and releases its context on the
/// way out of `Session::execute`.
pub fn kill(executor: &Executor, ctx: &Context) -> Result<String> {
    let killed = executor.registry().kill_all();
    info!(target: "arbor::cmd", user = %ctx.identity().user, killed, "kill");
    Ok(format!("{} sessions killed.", killed))
}
