use std::{error::Error, time::Duration};

use clicker_rl::{
    algo::{LinearSarsaConfig, SemiGradientSarsa},
    exploration::Estimates,
    gym::{FactoryAction, PaperclipFactory},
    state::{StateConfig, Transform},
    RunConfig, SarsaLearner,
};

fn main() -> Result<(), Box<dyn Error>> {
    let state = StateConfig {
        features: ["funds", "unsold", "wire", "price", "demand", "wire_cost"]
            .map(String::from)
            .to_vec(),
        return_feature: String::from("clips"),
        transform: Transform::Log10,
    };

    let mut learner = SarsaLearner::linear_sarsa(
        PaperclipFactory::new(42)?,
        state,
        FactoryAction::ids(),
        LinearSarsaConfig { drift: 0.1 },
        SemiGradientSarsa::new(0.05, 0.5)?,
    )?;

    learner.start(RunConfig {
        iterations: Some(2000),
        interval: Duration::from_millis(1),
    })?;
    let report = learner.wait()?.unwrap_or_default();
    let snapshot = learner.snapshot();

    println!(
        "{} cycles, {} failed actions, {} clips made",
        report.cycles, report.failed_actions, snapshot.returns
    );
    println!("\nAction distribution:");
    for (id, share) in snapshot.action_ids.iter().zip(&snapshot.distribution) {
        println!("  {id:>12}: {share:.3}");
    }
    if let Estimates::Weights(weights) = &snapshot.estimates {
        println!("\nWeights ({}):", snapshot.feature_names.join(", "));
        for (id, row) in snapshot.action_ids.iter().zip(weights) {
            let row = row.iter().map(|w| format!("{w:8.3}")).collect::<Vec<_>>();
            println!("  {id:>12}: {}", row.join(" "));
        }
    }
    Ok(())
}
