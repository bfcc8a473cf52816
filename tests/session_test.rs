mod common;

use approx::assert_relative_eq;
use common::{
    History, RecordingReport, ScriptedGateway, fast_settings, letter_symbols, make_bar, universe,
};
use dipbuyer::domain::contract::{OrderAction, OrderType, SecurityType};
use dipbuyer::domain::session::{WaitMode, run_session};
use dipbuyer::domain::selector::{ORDER_QUANTITY, TOP_N};
use std::time::{Duration, Instant};

/// Fifteen symbols, AAA at -20% and BBB..OOO spread from -14% to -1%.
fn fifteen_symbol_gateway() -> (Vec<String>, ScriptedGateway) {
    let symbols = letter_symbols(15);
    let mut gateway = ScriptedGateway::new().with_next_valid_id(Some(1000));
    for (i, symbol) in symbols.iter().enumerate() {
        let close = if i == 0 { 80.0 } else { 100.0 - (15 - i) as f64 };
        gateway = gateway.with_change(symbol, 100.0, close);
    }
    (symbols, gateway)
}

#[test]
fn buys_the_ten_most_declined() {
    let _ = env_logger::try_init();
    let (symbols, gateway) = fifteen_symbol_gateway();
    let report_sink = RecordingReport::default();

    let report = run_session(&gateway, &universe(&symbols), &fast_settings(), &report_sink);

    assert!(report.ready);
    assert_eq!(report.observations, 15);
    assert_eq!(report.selected.len(), TOP_N);
    assert_eq!(report.selected[0].symbol, "AAA");
    assert_relative_eq!(report.selected[0].percent_change, -20.0, epsilon = 1e-9);
    for pair in report.selected.windows(2) {
        assert!(pair[0].percent_change <= pair[1].percent_change);
    }

    // BBB..JJJ are -14%..-6%, KKK..OOO are not bought.
    let bought = gateway.placed_symbols();
    assert_eq!(
        bought,
        vec!["AAA", "BBB", "CCC", "DDD", "EEE", "FFF", "GGG", "HHH", "III", "JJJ"]
    );
    assert!(report.missing.is_empty());
    assert_eq!(report_sink.last(), report.selected);
    assert_eq!(gateway.disconnect_count(), 1);
}

#[test]
fn one_loser_among_gainers_leads_and_ties_keep_arrival_order() {
    // AAA -20%, BBB..OOO flat or up, with pairs sharing a change.
    let closes = [
        80.0, 103.0, 100.0, 101.0, 100.0, 105.0, 101.0, 102.0, 110.0, 102.0, 104.0, 100.0,
        108.0, 106.0, 107.0,
    ];
    let symbols = letter_symbols(closes.len());
    let mut gateway = ScriptedGateway::new().with_next_valid_id(Some(1));
    for (symbol, close) in symbols.iter().zip(closes) {
        gateway = gateway.with_change(symbol, 100.0, close);
    }

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert_eq!(report.observations, 15);
    assert_eq!(report.selected[0].symbol, "AAA");
    assert_relative_eq!(report.selected[0].percent_change, -20.0, epsilon = 1e-9);

    let selected: Vec<&str> = report.selected.iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(
        selected,
        vec!["AAA", "CCC", "EEE", "LLL", "DDD", "GGG", "HHH", "JJJ", "BBB", "KKK"]
    );
    let expected = [0.0, 0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 4.0];
    for (observation, change) in report.selected[1..].iter().zip(expected) {
        assert_relative_eq!(observation.percent_change, change, epsilon = 1e-9);
    }
    assert_eq!(gateway.placed_symbols(), selected);
}

#[test]
fn orders_are_market_buys_of_fixed_quantity() {
    let (symbols, gateway) = fifteen_symbol_gateway();
    run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    for (_, contract, order) in gateway.placed_orders() {
        assert_eq!(contract.security_type, SecurityType::Stock);
        assert_eq!(contract.exchange, "SMART");
        assert_eq!(contract.currency, "USD");
        assert_eq!(order.action, OrderAction::Buy);
        assert_eq!(order.order_type, OrderType::Market);
        assert_relative_eq!(order.total_quantity, ORDER_QUANTITY);
    }
}

#[test]
fn order_ids_increase_from_next_valid_id() {
    let (symbols, gateway) = fifteen_symbol_gateway();
    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    let ids: Vec<i32> = gateway.placed_orders().iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids, (1000..1010).collect::<Vec<_>>());
    let reported: Vec<i32> = report.orders.iter().map(|o| o.order_id).collect();
    assert_eq!(reported, ids);
}

#[test]
fn every_symbol_gets_both_requests_with_distinct_ids() {
    let symbols = letter_symbols(6);
    let mut gateway = ScriptedGateway::new();
    for symbol in &symbols {
        gateway = gateway.with_change(symbol, 50.0, 49.0);
    }
    run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    let market = gateway.market_data_requests.lock().unwrap().clone();
    let history = gateway.historical_requests.lock().unwrap().clone();
    assert_eq!(market.len(), 6);
    assert_eq!(history.len(), 6);

    let mut ids: Vec<i32> = market
        .iter()
        .map(|(id, _)| *id)
        .chain(history.iter().map(|(id, _, _)| *id))
        .collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 12);

    for (_, _, request) in &history {
        assert_eq!(request.duration(), "1 D");
        assert!(request.use_rth);
        assert!(!request.keep_up_to_date);
    }
}

#[test]
fn historical_error_is_logged_and_session_continues() {
    let symbols = letter_symbols(4);
    let gateway = ScriptedGateway::new()
        .with_change("AAA", 100.0, 95.0)
        .with_history(
            "BBB",
            History::Error {
                code: 162,
                message: "Historical Market Data Service error message".into(),
            },
        )
        .with_change("CCC", 100.0, 90.0)
        .with_change("DDD", 100.0, 101.0);

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert_eq!(report.observations, 3);
    assert!(report.errors_reported >= 1);
    assert!(report.missing.is_empty());
    assert_eq!(gateway.placed_symbols(), vec!["CCC", "AAA", "DDD"]);
}

#[test]
fn fewer_than_ten_observations_buys_all_of_them() {
    let symbols = letter_symbols(3);
    let gateway = ScriptedGateway::new()
        .with_change("AAA", 10.0, 11.0)
        .with_change("BBB", 10.0, 9.0)
        .with_change("CCC", 10.0, 10.0);

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    let selected: Vec<&str> = report.selected.iter().map(|o| o.symbol.as_str()).collect();
    assert_eq!(selected, vec!["BBB", "CCC", "AAA"]);
    assert_eq!(report.orders.len(), 3);
}

#[test]
fn extra_bar_for_a_symbol_keeps_the_first() {
    let symbols = letter_symbols(2);
    let gateway = ScriptedGateway::new()
        .with_history(
            "AAA",
            History::Bars(vec![make_bar(100.0, 99.0), make_bar(100.0, 50.0)]),
        )
        .with_change("BBB", 100.0, 98.0);

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert_eq!(report.observations, 2);
    assert_eq!(report.selected[0].symbol, "BBB");
    assert_relative_eq!(report.selected[1].percent_change, -1.0, epsilon = 1e-9);
}

#[test]
fn zero_open_bar_is_not_ranked() {
    let symbols = letter_symbols(2);
    let gateway = ScriptedGateway::new()
        .with_change("AAA", 0.0, 5.0)
        .with_change("BBB", 100.0, 98.0);

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert_eq!(report.observations, 1);
    assert_eq!(gateway.placed_symbols(), vec!["BBB"]);
}

#[test]
fn late_bar_during_order_placement_does_not_deadlock() {
    let (symbols, gateway) = fifteen_symbol_gateway();
    let gateway = gateway.with_late_bar_on_order("KKK", make_bar(100.0, 1.0));

    let started = Instant::now();
    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(report.orders.len(), TOP_N);
    // Ranking was fixed before the late bar arrived.
    assert!(!gateway.placed_symbols().contains(&"KKK".to_string()));
}

#[test]
fn no_next_valid_id_means_no_orders() {
    let (symbols, gateway) = fifteen_symbol_gateway();
    let gateway = gateway.with_next_valid_id(None);

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert!(!report.ready);
    assert_eq!(report.observations, 15);
    assert_eq!(report.selected.len(), TOP_N);
    assert!(report.orders.is_empty());
    assert!(gateway.placed_orders().is_empty());
    assert!(report.errors_reported >= TOP_N as u64);
}

#[test]
fn connect_failure_is_reported_and_session_still_finishes() {
    let symbols = letter_symbols(3);
    let gateway = ScriptedGateway::new().with_connect_error("connection refused");

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert!(!report.ready);
    assert_eq!(report.observations, 0);
    assert!(report.selected.is_empty());
    assert!(report.orders.is_empty());
    // One for connect, one per request.
    assert_eq!(report.errors_reported, 1 + 2 * 3);
    assert_eq!(gateway.disconnect_count(), 1);
}

#[test]
fn rejected_order_does_not_stop_the_rest() {
    let (symbols, gateway) = fifteen_symbol_gateway();
    let gateway = gateway.with_order_reject("CCC", "order rejected");

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert_eq!(report.orders.len(), TOP_N - 1);
    assert!(!gateway.placed_symbols().contains(&"CCC".to_string()));
    // The rejected order still used up id 1002.
    let ids: Vec<i32> = gateway.placed_orders().iter().map(|(id, _, _)| *id).collect();
    assert_eq!(ids[1], 1001);
    assert_eq!(ids[2], 1003);
}

#[test]
fn silent_request_is_reported_missing_after_timeout() {
    let symbols = letter_symbols(3);
    let gateway = ScriptedGateway::new()
        .with_change("AAA", 100.0, 97.0)
        .with_history("BBB", History::Silent)
        .with_change("CCC", 100.0, 99.0);
    let mut settings = fast_settings();
    settings.settle_timeout = Duration::from_millis(100);

    let started = Instant::now();
    let report = run_session(
        &gateway,
        &universe(&symbols),
        &settings,
        &RecordingReport::default(),
    );

    assert!(started.elapsed() >= Duration::from_millis(100));
    assert_eq!(report.missing, vec!["BBB".to_string()]);
    assert_eq!(report.observations, 2);
    assert_eq!(gateway.placed_symbols(), vec!["AAA", "CCC"]);
}

#[test]
fn rejected_historical_request_is_not_waited_for() {
    let symbols = letter_symbols(2);
    let gateway = ScriptedGateway::new()
        .with_change("AAA", 100.0, 97.0)
        .with_history("BBB", History::Reject("pacing violation".into()));
    let mut settings = fast_settings();
    settings.settle_timeout = Duration::from_secs(5);

    let started = Instant::now();
    let report = run_session(
        &gateway,
        &universe(&symbols),
        &settings,
        &RecordingReport::default(),
    );

    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(report.missing.is_empty());
    assert_eq!(report.observations, 1);
}

#[test]
fn fixed_delay_waits_the_full_timeout() {
    let symbols = letter_symbols(2);
    let gateway = ScriptedGateway::new()
        .with_change("AAA", 100.0, 97.0)
        .with_change("BBB", 100.0, 99.0);
    let mut settings = fast_settings();
    settings.wait_mode = WaitMode::FixedDelay;
    settings.settle_timeout = Duration::from_millis(150);

    let started = Instant::now();
    let report = run_session(
        &gateway,
        &universe(&symbols),
        &settings,
        &RecordingReport::default(),
    );

    assert!(started.elapsed() >= Duration::from_millis(150));
    assert_eq!(report.observations, 2);
    assert!(report.missing.is_empty());
}

#[test]
fn market_data_ticks_are_counted() {
    let symbols = letter_symbols(3);
    let gateway = ScriptedGateway::new().with_ticks(4);

    let report = run_session(
        &gateway,
        &universe(&symbols),
        &fast_settings(),
        &RecordingReport::default(),
    );

    assert_eq!(report.ticks_received, 12);
    assert_eq!(report.observations, 0);
}
