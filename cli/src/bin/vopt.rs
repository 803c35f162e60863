use definitions::*;
use std::io::BufReader;
use std::path::Path;
use variant_optimizer::{GmmConfig, RecalibrateConfig};
#[macro_use]
extern crate log;

fn main() -> std::io::Result<()> {
    let matches = vopt_cli::vopt_commands::vopt_parser().get_matches();
    if let Some(("pipeline", sub_m)) = matches.subcommand() {
        let path: &String = sub_m.get_one("profile").unwrap();
        use std::io::Read;
        let mut rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
        let mut file = String::new();
        rdr.read_to_string(&mut file)?;
        let config: vopt_cli::pipeline::PipelineConfig = toml::from_str(&file)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        return vopt_cli::pipeline::run_pipeline(&config);
    }
    if let Some((_, sub_m)) = matches.subcommand() {
        let level = match sub_m.get_count("verbose") {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
        set_threads(sub_m);
    }
    let mut ds = get_input_file()?;
    let ds = &mut ds;
    match matches.subcommand() {
        Some(("fit", sub_m)) => fit(sub_m, ds),
        Some(("apply", sub_m)) => apply(sub_m, ds).and_then(|_| flush_file(ds)),
        _ => unreachable!(),
    }
}

fn parse_arg<T: std::str::FromStr>(matches: &clap::ArgMatches, id: &str) -> std::io::Result<T> {
    matches
        .get_one::<String>(id)
        .and_then(|e| e.parse().ok())
        .ok_or_else(|| {
            let message = format!("--{} should be a number", id);
            std::io::Error::new(std::io::ErrorKind::InvalidInput, message)
        })
}

fn fit(matches: &clap::ArgMatches, dataset: &VariantSet) -> std::io::Result<()> {
    debug!("START\tFit step");
    let annotations: Vec<String> = matches
        .get_one::<String>("annotations")
        .map(|keys| keys.split(',').map(|k| k.trim().to_string()).collect())
        .unwrap_or_default();
    let cluster_file: &String = matches.get_one("clusters").unwrap();
    let report = matches.get_one::<String>("report").map(|x| x.as_str());
    let config = GmmConfig::new(
        parse_arg(matches, "num_gaussians")?,
        parse_arg(matches, "num_iterations")?,
        parse_arg(matches, "min_var_in_cluster")?,
        parse_arg(matches, "max_ac")?,
        parse_arg(matches, "seed")?,
    );
    let cluster_file = Path::new(cluster_file);
    vopt_cli::pipeline::fit(dataset, &annotations, &config, cluster_file, report)?;
    Ok(())
}

fn apply(matches: &clap::ArgMatches, dataset: &mut VariantSet) -> std::io::Result<()> {
    debug!("START\tApply step");
    let cluster_file: &String = matches.get_one("clusters").unwrap();
    let curve = matches.get_one::<String>("output").map(|x| x.as_str());
    let config = RecalibrateConfig::new(
        parse_arg(matches, "target_titv")?,
        parse_arg(matches, "back_off")?,
        matches.get_flag("use_ac_prior"),
        parse_arg(matches, "desired_num_variants")?,
    );
    let cluster_file = Path::new(cluster_file);
    vopt_cli::pipeline::apply(dataset, cluster_file, &config, curve)?;
    Ok(())
}

fn get_input_file() -> std::io::Result<VariantSet> {
    let stdin = std::io::stdin();
    let reader = BufReader::new(stdin.lock());
    match serde_json::de::from_reader(reader) {
        Err(why) => {
            eprintln!("{:?}", why);
            eprintln!("Invalid Input from STDIN.");
            Err(std::io::Error::from(std::io::ErrorKind::Other))
        }
        Ok(res) => Ok(res),
    }
}

fn flush_file(dataset: &VariantSet) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut wtr = std::io::BufWriter::new(stdout.lock());
    match serde_json::ser::to_writer(&mut wtr, dataset) {
        Err(why) => {
            eprintln!("{:?}", why);
            eprintln!("Invalid output to the STDOUT.");
            std::process::exit(1);
        }
        _ => Ok(()),
    }
}

fn set_threads(matches: &clap::ArgMatches) {
    if let Some(threads) = matches
        .get_one("threads")
        .and_then(|num: &String| num.parse().ok())
    {
        debug!("Set Threads\t{}", threads);
        if let Err(why) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
        {
            debug!("{:?}", why);
        }
    }
}
