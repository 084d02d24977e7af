//! Command handlers that drive a dropdown pair from the terminal.
//!
//! Each handler loads the store, performs the same calls a form would, and
//! prints the resulting options. Empty option lists are printed as nothing;
//! an unreachable backend is reported as an error.

use std::io::Write;

use ridedesk_locations::{
    resolve_center_by_name, AddressMode, CascadeSelect, LocationSource, LocationStore,
    SelectOption,
};
use serde::Serialize;

use crate::Commands;

fn mode_for(by_name: bool) -> AddressMode {
    if by_name {
        AddressMode::Name
    } else {
        AddressMode::Id
    }
}

pub(crate) async fn run<S: LocationSource + 'static>(
    store: LocationStore<S>,
    command: &Commands,
    json: bool,
) -> anyhow::Result<()> {
    store.load().await?;

    match command {
        Commands::States { by_name } => {
            let mut pair = CascadeSelect::new(store, mode_for(*by_name));
            print_rendered(&render_options(&pair.state_options().await, json)?)?;
        }
        Commands::Cities { state, by_name } => {
            let mut pair = CascadeSelect::new(store, mode_for(*by_name));
            run_cities(&mut pair, state, json).await?;
        }
        Commands::Centers { by_name } => {
            let mut pair = CascadeSelect::new(store, mode_for(*by_name));
            print_rendered(&render_options(&pair.center_options().await, json)?)?;
        }
        Commands::ResolveCenter { name } => {
            let ctx = store.snapshot().await;
            let center = resolve_center_by_name(&ctx, name)?
                .ok_or_else(|| anyhow::anyhow!("no center named '{name}'"))?;
            println!("{}\t{}", center.id, center.name);
        }
    }

    Ok(())
}

async fn run_cities<S: LocationSource + 'static>(
    pair: &mut CascadeSelect<S>,
    state: &str,
    json: bool,
) -> anyhow::Result<()> {
    let choice = pair
        .choose_state(state)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no state matches '{state}'"))?;
    let event = choice.settled().await;
    tracing::info!(value = %event.value, label = %event.label, "state chosen");

    let ctx = pair.store().snapshot().await;
    if let Some(failure) = ctx
        .last_error()
        .filter(|f| f.state_id == ctx.selection().state_id)
    {
        anyhow::bail!(
            "could not load cities for '{}': {}",
            event.label,
            failure.message
        );
    }

    print_rendered(&render_options(&pair.city_options().await, json)?)?;
    Ok(())
}

/// Render options as pretty JSON or as `value<TAB>label` lines.
pub(crate) fn render_options<T: Serialize>(
    options: &[SelectOption<T>],
    json: bool,
) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(options)?);
    }
    Ok(options
        .iter()
        .map(|o| format!("{}\t{}", o.value, o.label))
        .collect::<Vec<_>>()
        .join("\n"))
}

fn print_rendered(rendered: &str) -> std::io::Result<()> {
    write_rendered(&mut std::io::stdout().lock(), rendered)
}

/// Write `rendered` followed by a newline; an empty rendering writes nothing.
pub(crate) fn write_rendered(out: &mut impl Write, rendered: &str) -> std::io::Result<()> {
    if rendered.is_empty() {
        return Ok(());
    }
    writeln!(out, "{rendered}")
}
