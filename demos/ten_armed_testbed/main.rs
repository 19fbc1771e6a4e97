use std::{error::Error, fs, time::Duration};

use clicker_rl::{
    algo::SampleAverage,
    exploration::{BanditSelector, EpsilonGreedy, EpsilonGreedyConfig, Ucb, UcbConfig},
    gym::KArmedBandit,
    state::StateConfig,
    BanditLearner, RunConfig,
};

const STEP_LIMIT: u64 = 300;
const NUM_RUNS: u64 = 20;

fn state_config() -> StateConfig {
    StateConfig {
        return_feature: String::from("total"),
        ..Default::default()
    }
}

/// Run one learner to completion and report its total reward and how often it chose the best arm
fn evaluate<S>(env: KArmedBandit, selector: S) -> Result<(f64, f64), Box<dyn Error>>
where
    S: BanditSelector + 'static,
{
    let means = env.means();
    let best = means
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i + 1)
        .ok_or("bandit has no arms")?;

    let mut learner = BanditLearner::new(env, state_config(), selector, SampleAverage)?;
    learner.start(RunConfig {
        iterations: Some(STEP_LIMIT),
        interval: Duration::from_micros(200),
    })?;
    let report = learner.wait()?.unwrap_or_default();
    let snapshot = learner.snapshot();
    Ok((report.total_reward, snapshot.distribution[best]))
}

fn main() -> Result<(), Box<dyn Error>> {
    fs::create_dir_all("local")?;
    let mut wtr = csv::Writer::from_path("local/ten_armed_testbed.csv")?;
    wtr.write_record(["strategy", "run", "total_reward", "best_arm_share"])?;

    for run in 0..NUM_RUNS {
        let env = || KArmedBandit::new(10, run);
        let ids = env()?.action_ids();

        let mut results = Vec::new();
        for epsilon in [0.1, 0.01, 0.0] {
            let selector = EpsilonGreedy::new(ids.clone(), EpsilonGreedyConfig { epsilon })?;
            results.push((format!("epsilon = {epsilon}"), evaluate(env()?, selector)?));
        }
        let selector = Ucb::new(ids.clone(), UcbConfig { drift: 2.0 })?;
        results.push((String::from("ucb, drift = 2"), evaluate(env()?, selector)?));

        for (strategy, (total, share)) in results {
            wtr.write_record([strategy, run.to_string(), total.to_string(), share.to_string()])?;
        }
    }

    wtr.flush()?;
    println!("wrote local/ten_armed_testbed.csv");
    Ok(())
}
