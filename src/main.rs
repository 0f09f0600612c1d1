use std::process::ExitCode;

use sigdecomp::configuration::Configuration;
use sigdecomp::manager::manager::IManager;
use sigdecomp::verification::strategyequivalence::VerificationError;
use tracing::error;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sigdecomp=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some(config_path) = args.get(1) else {
        eprintln!("usage: sigdecomp <config.json> [x ...]");
        return ExitCode::from(2);
    };
    let query_points: Result<Vec<f64>, _> = args[2..].iter().map(|s| s.parse::<f64>()).collect();
    let query_points = match query_points {
        Ok(xs) => xs,
        Err(err) => {
            eprintln!("invalid query point: {}", err);
            return ExitCode::from(2);
        }
    };

    let config = Configuration::new();
    if let Err(err) = config.from_reader(config_path.to_owned()) {
        error!("failed to load configuration '{}': {}", config_path, err);
        return ExitCode::FAILURE;
    }

    let checker = config.strategy_equivalence();
    let manager = config.measure_function_manager();
    let mut failed = false;
    for name in manager.names() {
        let table = match manager.get(&name) {
            Ok(table) => table,
            Err(err) => {
                error!("{}", err);
                failed = true;
                continue;
            }
        };
        let xs = if query_points.is_empty() {
            let midpoint = 0.5 * (table.lower_bound() + table.upper_bound());
            vec![table.lower_bound(), midpoint, table.upper_bound()]
        } else {
            query_points.clone()
        };
        for x in xs {
            let value = checker
                .check_evaluation(&table, x)
                .and_then(|_| config.evaluate(&table, x).map_err(VerificationError::from));
            match value {
                Ok(value) => println!("{}, {}, {}", name, x, value),
                Err(err) => {
                    error!("measure function '{}': {}", name, err);
                    failed = true;
                }
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
