use vigil::prelude::*;

fn main() {
    let args: Vec<String> = std::env::args().collect();
    if args.len() >= 2 && (args[1] == "--help" || args[1] == "-h" || args[1] == "help") {
        print_help();
        return;
    }
    if args.len() >= 2 && args[1] == "practice-sim" {
        let opts = match SimOptions::parse(&args[2..]) {
            Ok(opts) => opts,
            Err(msg) => {
                eprintln!("{msg}");
                print_help();
                std::process::exit(2);
            }
        };
        run_practice_sim(opts);
        return;
    }

    if args.len() >= 2 {
        eprintln!("Unknown command: {}", args[1]);
        print_help();
        std::process::exit(2);
    }

    run_practice_sim(SimOptions::default());
}

fn print_help() {
    println!("vigil - line-discrimination vigilance task core");
    println!();
    println!("Usage:");
    println!("  vigil                      Run a simulated practice phase with defaults");
    println!("  vigil practice-sim [opts]  Run a simulated practice phase");
    println!("      --seed N               PRNG seed (default 42)");
    println!("      --sensitivity X        Simulated observer sensitivity (default 0.35)");
    println!("      --max-trials N         Safety cap on practice trials (default 400)");
    println!("  vigil help                 Show this help");
}

#[derive(Debug, Clone, Copy)]
struct SimOptions {
    seed: u64,
    sensitivity: f32,
    max_trials: u32,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            sensitivity: ObserverConfig::default().sensitivity,
            max_trials: 400,
        }
    }
}

impl SimOptions {
    fn parse(args: &[String]) -> Result<Self, String> {
        let mut opts = Self::default();
        let mut i = 0;
        while i < args.len() {
            let flag = args[i].as_str();
            let value = args
                .get(i + 1)
                .ok_or_else(|| format!("{flag} needs a value"))?;
            match flag {
                "--seed" => {
                    opts.seed = value
                        .parse()
                        .map_err(|_| format!("bad --seed value: {value}"))?;
                }
                "--sensitivity" => {
                    opts.sensitivity = value
                        .parse()
                        .map_err(|_| format!("bad --sensitivity value: {value}"))?;
                }
                "--max-trials" => {
                    opts.max_trials = value
                        .parse()
                        .map_err(|_| format!("bad --max-trials value: {value}"))?;
                }
                other => return Err(format!("Unknown option: {other}")),
            }
            i += 2;
        }
        Ok(opts)
    }
}

/// Drive a full practice phase with the simulated observer, printing one
/// line per assessment.
fn run_practice_sim(opts: SimOptions) {
    let cfg = SessionConfig::default();
    let mut session = PracticeSession::new(cfg, opts.seed);
    let mut observer = SimulatedObserver::new(
        ObserverConfig {
            sensitivity: opts.sensitivity,
            ..ObserverConfig::default()
        },
        opts.seed ^ 0x5EED,
    );

    println!(
        "practice-sim: seed={} sensitivity={} band=[{}, {}]/{} start_offset={}",
        opts.seed,
        opts.sensitivity,
        cfg.practice.lower_bound,
        cfg.practice.upper_bound,
        cfg.practice.assessment_window,
        cfg.practice.initial_offset_mod,
    );

    let mut assessments = 0usize;
    while session.is_practicing() && session.trial_num() <= opts.max_trials {
        let offset = session.offset_mod();
        let response = observer.respond(session.target_present(), offset);

        let record = match session.complete_trial(response.is_some(), response) {
            Ok(record) => record,
            Err(e) => {
                eprintln!("assessment failed: {e}");
                std::process::exit(1);
            }
        };

        if let Some(assessment) = session.last_assessment() {
            if assessment.at_trial == record.trial_num as usize {
                assessments += 1;
                println!(
                    "trial {:>3}: {:>2}/{} correct -> {:<5} adjust {:+.1} offset_mod {:.1}{}",
                    assessment.at_trial,
                    assessment.correct_count,
                    cfg.practice.assessment_window,
                    assessment.performance.label(),
                    assessment.adjustment,
                    session.offset_mod(),
                    if assessment.stable { "  [stable]" } else { "" },
                );
            }
        }
    }

    let stats = session.stats();
    println!();
    if session.is_practicing() {
        println!(
            "no stability after {} trials ({} assessments); stopping",
            session.trial_num() - 1,
            assessments
        );
    } else {
        println!(
            "practice stable after {} trials ({} assessments)",
            stats.trials, assessments
        );
    }
    println!(
        "totals: {} trials, accuracy {:.2}, hit rate {:.2}, false alarm rate {:.2}, final offset_mod {:.1}",
        stats.trials,
        stats.accuracy(),
        stats.hit_rate(),
        stats.false_alarm_rate(),
        session.offset_mod(),
    );
}
