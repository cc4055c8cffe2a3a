use std::fs;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tradesim::rl::environment::{read_action_log, replay, ACTION_LOG_HEADER};
use tradesim::rl::{
    evaluate_agent, ActionCounts, CsvActionLog, DiscreteAction, MemoryActionLog, NoopEventHook,
    RandomPolicy, TradingEnvConfig, TradingEnvironment,
};
use tradesim::{load_close_prices, CsvLayout, PriceSeries};

fn config() -> TradingEnvConfig {
    TradingEnvConfig {
        window_size: 4,
        initial_balance: 250.0,
        max_steps_per_episode: 50,
        ..Default::default()
    }
}

fn prices(seed: u64) -> PriceSeries {
    let mut rng = StdRng::seed_from_u64(seed);
    let values = (0..40).map(|_| rng.gen_range(50.0..150.0)).collect();
    PriceSeries::new(values).unwrap()
}

#[test]
fn replayed_log_matches_live_trajectory() {
    for seed in 0..10 {
        let sink = MemoryActionLog::new();
        let mut env = TradingEnvironment::with_hooks(
            prices(seed),
            config(),
            Some(Box::new(sink.clone())),
            Box::new(NoopEventHook),
        )
        .unwrap();
        assert_eq!(env.shares_held(), 1, "opening purchase must be affordable");

        // State after reset, then after every step that did not end the episode
        let mut live = vec![(env.balance(), env.shares_held())];
        let mut rng = StdRng::seed_from_u64(seed + 500);
        loop {
            let action = DiscreteAction::from_index(rng.gen_range(0..3)).unwrap();
            let result = env.step(action).unwrap();
            if result.done {
                break;
            }
            live.push((env.balance(), env.shares_held()));
        }

        let episodes = sink.episodes();
        assert_eq!(episodes.len(), 1);
        let entries = &episodes[0];
        assert_eq!(entries.len(), env.episode_steps() + 1);
        assert_eq!(entries[0].action, DiscreteAction::Buy);

        let outcome = replay(entries, config().initial_balance);
        let replayed: Vec<_> = outcome
            .trajectory
            .iter()
            .map(|state| (state.balance, state.shares_held))
            .collect();

        assert_eq!(replayed.len(), live.len() + 1);
        assert_eq!(&replayed[..live.len()], &live[..]);
        assert_eq!(outcome.final_balance, env.balance());
        assert_eq!(Some(outcome.total_profit), env.total_profit());
    }
}

#[test]
fn csv_sink_is_rewritten_every_episode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("actions_log.csv");

    let mut env = TradingEnvironment::with_hooks(
        prices(3),
        config(),
        Some(Box::new(CsvActionLog::new(&path))),
        Box::new(NoopEventHook),
    )
    .unwrap();

    let mut policy = RandomPolicy::new(11);
    let first = evaluate_agent(&mut env, &mut policy).unwrap();
    let first_rows = read_action_log(&path).unwrap();
    assert_eq!(first_rows.len(), first.steps + 1);

    let second = evaluate_agent(&mut env, &mut policy).unwrap();
    let second_rows = read_action_log(&path).unwrap();
    assert_eq!(second_rows.len(), second.steps + 1);

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().next(), Some(ACTION_LOG_HEADER.join(",").as_str()));
    assert_eq!(text.lines().count(), second.steps + 2);

    let counts = ActionCounts::tally(&second_rows);
    assert_eq!(counts.total(), second_rows.len());
    assert!(counts.buy >= 1);
}

#[test]
fn unwritable_log_keeps_episode_result() {
    let dir = tempfile::tempdir().unwrap();
    // A directory cannot be opened as a file
    let mut env = TradingEnvironment::with_hooks(
        prices(5),
        config(),
        Some(Box::new(CsvActionLog::new(dir.path()))),
        Box::new(NoopEventHook),
    )
    .unwrap();

    let result = evaluate_agent(&mut env, &mut RandomPolicy::new(1)).unwrap();
    assert!(result.log_error.is_some());
    assert!(env.is_done());
    assert_eq!(Some(result.total_profit), env.total_profit());
}

#[test]
fn evaluates_downloaded_price_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("prices.csv");
    let mut text = String::from("Price,Close,High\nTicker,AAPL,AAPL\nDate,,\n");
    for day in 1..=20 {
        text.push_str(&format!("2024-01-{day:02},{}.5,{}\n", 100 + day, 101 + day));
    }
    fs::write(&path, text).unwrap();

    let series = load_close_prices(&path, CsvLayout::default()).unwrap();
    assert_eq!(series.len(), 20);
    assert_eq!(series.get(0), Some(101.5));

    let mut env = TradingEnvironment::with_hooks(series, config(), None, Box::new(NoopEventHook))
        .unwrap();
    let result = evaluate_agent(&mut env, &mut tradesim::rl::HoldPolicy).unwrap();

    // Bought at step 4 (105.5), held to the last close (120.5)
    assert_eq!(result.total_profit, 15.0);
    assert_eq!(result.trades, 1);
    assert_eq!(result.steps, 16);
}
