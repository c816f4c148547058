use anyhow::{bail, Context};
use pmt_coverage::{construct_detector, ConfigStore, MemoryStore, PmtInfo};
use std::{env, time::Instant};

const USAGE: &str = "usage: pmt-layout <template> [--coverage <fraction>] [--pickle <path>]";

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let mut template = None;
    let mut coverage = None;
    let mut pickle = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--coverage" => {
                let value = args.next().context(USAGE)?;
                coverage = Some(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("invalid coverage: {value}"))?,
                );
            }
            "--pickle" => pickle = Some(args.next().context(USAGE)?),
            "-h" | "--help" => {
                println!("{USAGE}");
                return Ok(());
            }
            _ if template.is_none() => template = Some(arg),
            _ => bail!("unexpected argument {arg}\n{USAGE}"),
        }
    }
    let template = template.context(USAGE)?;

    let mut store = MemoryStore::new();
    store.load(&template)?;
    if let Some(coverage) = coverage {
        store.set_d("DETECTOR", "", "photocathode_coverage", coverage);
    }

    let now = Instant::now();
    let report = construct_detector(&mut store)?;
    println!("{report}");
    println!("Layout computed in {}micros", now.elapsed().as_micros());

    if let Some(path) = pickle {
        PmtInfo::from_store(&store)?.to_pickle(&path)?;
        println!("PMT info saved to {path}");
    }

    Ok(())
}
