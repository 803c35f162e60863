use clap::Parser;
use rand_xoshiro::Xoshiro256PlusPlus;
use sandbox::{simulate_variants, SimulationProfile};
use std::io::BufWriter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(name = "SimulateVariants")]
#[clap(author = "Bansho Masutani<ban-m@g.ecc.u-tokyo.ac.jp>")]
#[clap(version = "1.0")]
#[clap(author,version,about,long_about=None)]
struct Args {
    /// Set the seed of a pseudorandom number generator.
    #[clap(short, long, default_value_t = 7)]
    seed: u64,
    /// Set the number of variants to be simulated.
    #[clap(short, long, default_value_t = 5000)]
    variant_num: usize,
    /// Set the fraction of the true variants.
    #[clap(short, long, default_value_t = 0.8)]
    true_rate: f64,
    /// Set the fraction of the true variants in the known catalogue.
    #[clap(short, long, default_value_t = 0.5)]
    known_rate: f64,
    /// Set the largest allele count.
    #[clap(short, long, default_value_t = 10)]
    max_ac: usize,
    /// Output JSON file.
    #[clap(short, long)]
    output: PathBuf,
}

fn main() -> std::io::Result<()> {
    let args = Args::parse();
    env_logger::init();
    let mut rng: Xoshiro256PlusPlus = rand::SeedableRng::seed_from_u64(args.seed);
    let profile = SimulationProfile {
        true_rate: args.true_rate,
        known_rate: args.known_rate,
        max_ac: args.max_ac.max(1),
        ..Default::default()
    };
    let dataset = simulate_variants(args.variant_num, &profile, &mut rng);
    let mut wtr = std::fs::File::create(&args.output).map(BufWriter::new)?;
    serde_json::ser::to_writer(&mut wtr, &dataset)?;
    log::info!("Wrote {} variants to {:?}", dataset.variants.len(), args.output);
    Ok(())
}
