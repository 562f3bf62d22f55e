use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::json;
use tbdisorder::context::SimulationContext;
use tbdisorder::disorder::AndersonAddress;
use tbdisorder::error::DisResult;
use tbdisorder::hamiltonian::HamiltonianAssembly;
use tbdisorder::orchestrator::EnsembleReport;

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn align_right_from(table: &mut Table, first: usize, last: usize) {
    for i in first..=last {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn print_context_summary(ctx: &SimulationContext) {
    let g = ctx.geometry();
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Orbitals").add_attribute(Attribute::Bold),
        Cell::new("Unit Cells"),
        Cell::new("Domains"),
        Cell::new("Border"),
        Cell::new("Threads"),
        Cell::new("Hoppings"),
        Cell::new("Energy Scale").fg(Color::Cyan),
    ]);
    table.add_row(vec![
        Cell::new(g.orbitals()),
        Cell::new(g.unit_cells()),
        Cell::new(g.domains()),
        Cell::new(g.border_size()),
        Cell::new(ctx.threads()),
        Cell::new(ctx.hopping().hopping_count()),
        Cell::new(format!("{:.4}", ctx.energy_scale())).fg(Color::Cyan),
    ]);
    align_right_from(&mut table, 0, 6);
    println!("\n{}", table);
}

pub fn print_address_table(assembly: &HamiltonianAssembly<'_>) {
    let table_data = assembly.address_table();
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Orbital").add_attribute(Attribute::Bold),
        Cell::new("Address"),
        Cell::new("Model"),
        Cell::new("Mean"),
        Cell::new("Spread"),
    ]);

    for (orbital, address) in table_data.addresses().iter().enumerate() {
        let model = assembly.entries().iter().find(|e| e.orbital == orbital);
        let (kind, mean, spread) = match model {
            Some(e) => (
                e.model.kind().to_string(),
                format!("{:.4}", e.model.mean()),
                format!("{:.4}", e.model.spread()),
            ),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        let address_cell = match address {
            AndersonAddress::Unassigned => Cell::new("unassigned"),
            AndersonAddress::Deterministic => Cell::new("fixed").fg(Color::Yellow),
            AndersonAddress::RandomSlot(slot) => Cell::new(format!("slot {}", slot)).fg(Color::Green),
        };

        table.add_row(vec![
            Cell::new(orbital).add_attribute(Attribute::Bold),
            address_cell,
            Cell::new(kind),
            Cell::new(mean),
            Cell::new(spread),
        ]);
    }
    align_right_from(&mut table, 3, 4);
    println!("\n{}", table);
    println!(
        "Realization buffer: {} slots x {} cells = {} values",
        table_data.random_slots(),
        assembly.geometry().unit_cells(),
        assembly.realization().len()
    );
}

pub fn print_defects(assembly: &HamiltonianAssembly<'_>) {
    if assembly.defects().is_empty() {
        println!("No structural disorder.");
        return;
    }

    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Defect").add_attribute(Attribute::Bold),
        Cell::new("Sites"),
    ]);
    for defect in assembly.defects() {
        table.add_row(vec![
            Cell::new(defect.path()),
            Cell::new(defect.positions().len()),
        ]);
    }
    align_right_from(&mut table, 1, 1);
    println!("\n{}", table);
}

pub fn print_onsite_sample(assembly: &HamiltonianAssembly<'_>, cells: usize) -> DisResult<()> {
    let orbitals = assembly.geometry().orbitals();
    let cells = cells.min(assembly.geometry().unit_cells());

    let mut table = new_table();
    let mut header = vec![Cell::new("Cell").add_attribute(Attribute::Bold)];
    header.extend((0..orbitals).map(|o| Cell::new(format!("orb {}", o))));
    table.set_header(header);

    for cell in 0..cells {
        let mut row = vec![Cell::new(cell).add_attribute(Attribute::Bold)];
        for orbital in 0..orbitals {
            row.push(Cell::new(format!(
                "{:+.5}",
                assembly.onsite_energy(orbital, cell)?
            )));
        }
        table.add_row(row);
    }
    align_right_from(&mut table, 1, orbitals);
    println!("\n{}", table);
    Ok(())
}

pub fn print_ensemble_report(report: &EnsembleReport) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Replica").add_attribute(Attribute::Bold),
        Cell::new("Stream"),
        Cell::new("Status"),
        Cell::new("Stage"),
        Cell::new("Metrics"),
    ]);

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(outputs) => {
                for out in outputs {
                    let metrics = out
                        .metrics
                        .iter()
                        .map(|(k, v)| format!("{}={:.5}", k, v))
                        .collect::<Vec<_>>()
                        .join("  ");
                    table.add_row(vec![
                        Cell::new(outcome.index).add_attribute(Attribute::Bold),
                        Cell::new(outcome.seed.stream),
                        Cell::new("ok").fg(Color::Green),
                        Cell::new(&out.stage),
                        Cell::new(metrics),
                    ]);
                }
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(outcome.index).add_attribute(Attribute::Bold),
                    Cell::new(outcome.seed.stream),
                    Cell::new("failed").fg(Color::Red),
                    Cell::new("-"),
                    Cell::new(e.to_string()).fg(Color::Red),
                ]);
            }
        }
    }
    println!("\nRoot seed: {}", report.root_seed);
    println!("{}", table);
}

pub fn print_ensemble_summary(report: &EnsembleReport, stage: &str) {
    let mut table = new_table();
    table.set_header(vec![
        Cell::new("Metric").add_attribute(Attribute::Bold),
        Cell::new("Ensemble Mean").fg(Color::Cyan),
    ]);

    for metric in ["mean", "variance", "defect_sites"] {
        let value = report
            .ensemble_mean(stage, metric)
            .map(|v| format!("{:.6}", v))
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![Cell::new(metric), Cell::new(value).fg(Color::Cyan)]);
    }
    align_right_from(&mut table, 1, 1);
    println!("\n{}", table);
}

pub fn ensemble_json(report: &EnsembleReport) -> DisResult<String> {
    let outcomes: Vec<_> = report
        .outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(outputs) => json!({ "replica": o.index, "seed": o.seed, "stages": outputs }),
            Err(e) => json!({ "replica": o.index, "seed": o.seed, "error": e.to_string() }),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&json!({
        "root_seed": report.root_seed,
        "outcomes": outcomes,
    }))?)
}
