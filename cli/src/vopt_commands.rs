use clap::{Arg, ArgAction, Command};

fn arg_verbose() -> Arg {
    Arg::new("verbose")
        .short('v')
        .action(ArgAction::Count)
        .help("Debug mode")
}

fn arg_threads() -> Arg {
    Arg::new("threads")
        .short('t')
        .long("threads")
        .required(false)
        .value_name("THREADS")
        .help("Number of Threads")
        .default_value("1")
        .num_args(1)
}

fn subcommand_fit() -> Command {
    Command::new("fit")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Fit a Gaussian mixture model on the annotations of the variants from STDIN.")
        .arg(arg_verbose())
        .arg(arg_threads())
        .arg(
            Arg::new("annotations")
                .short('a')
                .long("annotations")
                .required(true)
                .value_name("KEYS")
                .help("Comma-separated annotation names. `QUAL` is the quality of the call.")
                .num_args(1),
        )
        .arg(
            Arg::new("clusters")
                .short('c')
                .long("clusters")
                .required(true)
                .value_name("CLUSTER_FILE")
                .help("Output cluster file. Checkpoints are written as CLUSTER_FILE.<iteration>.")
                .num_args(1),
        )
        .arg(
            Arg::new("num_gaussians")
                .short('g')
                .long("num_gaussians")
                .value_name("NUM")
                .help("Number of Gaussians.")
                .default_value("4")
                .num_args(1),
        )
        .arg(
            Arg::new("num_iterations")
                .short('i')
                .long("num_iterations")
                .value_name("NUM")
                .help("Number of EM iterations.")
                .default_value("10")
                .num_args(1),
        )
        .arg(
            Arg::new("min_var_in_cluster")
                .long("min_var_in_cluster")
                .value_name("NUM")
                .help("Clusters explaining [NUM] variants or fewer are not written.")
                .default_value("0")
                .num_args(1),
        )
        .arg(
            Arg::new("max_ac")
                .long("max_ac")
                .value_name("AC")
                .help("The largest allele count in the allele count prior. 0 to disable.")
                .default_value("0")
                .num_args(1),
        )
        .arg(
            Arg::new("seed")
                .short('s')
                .long("seed")
                .value_name("SEED")
                .help("Seed of the pseudo random number generator.")
                .default_value("91801305")
                .num_args(1),
        )
        .arg(
            Arg::new("report")
                .short('r')
                .long("report")
                .value_name("PREFIX")
                .help("Write histograms of the annotations into PREFIX.<annotation>.dat.")
                .num_args(1),
        )
}

fn subcommand_apply() -> Command {
    Command::new("apply")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Score the variants from STDIN by a cluster file and output them to STDOUT.")
        .arg(arg_verbose())
        .arg(arg_threads())
        .arg(
            Arg::new("clusters")
                .short('c')
                .long("clusters")
                .required(true)
                .value_name("CLUSTER_FILE")
                .help("Cluster file written by `fit`.")
                .num_args(1),
        )
        .arg(
            Arg::new("back_off")
                .short('b')
                .long("back_off")
                .value_name("FACTOR")
                .help("Multiply every covariance by [FACTOR].")
                .default_value("1.0")
                .num_args(1),
        )
        .arg(
            Arg::new("use_ac_prior")
                .long("use_ac_prior")
                .action(ArgAction::SetTrue)
                .help("Multiply the scores by the allele count prior."),
        )
        .arg(
            Arg::new("target_titv")
                .long("target_titv")
                .value_name("TITV")
                .help("Expected Ti/Tv ratio of the true variants.")
                .default_value("2.1")
                .num_args(1),
        )
        .arg(
            Arg::new("desired_num_variants")
                .long("desired_num_variants")
                .value_name("NUM")
                .help("Report the strictest cut retaining at least [NUM] variants. 0 to disable.")
                .default_value("0")
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("PREFIX")
                .help("Write the optimization curve into PREFIX.dat.")
                .num_args(1),
        )
}

fn subcommand_pipeline() -> Command {
    Command::new("pipeline")
        .version("0.1")
        .author("Bansho Masutani")
        .about("Run fit and apply by a TOML profile.")
        .arg(
            Arg::new("profile")
                .required(true)
                .value_name("TOML")
                .help("TOML configuration file."),
        )
}

pub fn vopt_parser() -> clap::Command {
    clap::Command::new("vopt")
        .version("0.1")
        .author("Bansho Masutani <ban-m@g.ecc.u-tokyo.ac.jp>")
        .about("Variant quality optimizer by Gaussian mixture models")
        .arg_required_else_help(true)
        .subcommand(subcommand_fit())
        .subcommand(subcommand_apply())
        .subcommand(subcommand_pipeline())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn parse_fit() {
        let args = ["vopt", "fit", "-vv", "-a", "QD,SB", "-c", "out.clusters"];
        let matches = vopt_parser().try_get_matches_from(args).unwrap();
        let (name, sub_m) = matches.subcommand().unwrap();
        assert_eq!(name, "fit");
        assert_eq!(sub_m.get_count("verbose"), 2);
        let keys: &String = sub_m.get_one("annotations").unwrap();
        assert_eq!(keys, "QD,SB");
        let num: &String = sub_m.get_one("num_gaussians").unwrap();
        assert_eq!(num, "4");
        assert!(sub_m.get_one::<String>("report").is_none());
    }
    #[test]
    fn parse_apply() {
        let args = ["vopt", "apply", "-c", "in.clusters", "--use_ac_prior"];
        let matches = vopt_parser().try_get_matches_from(args).unwrap();
        let (name, sub_m) = matches.subcommand().unwrap();
        assert_eq!(name, "apply");
        assert!(sub_m.get_flag("use_ac_prior"));
        let titv: &String = sub_m.get_one("target_titv").unwrap();
        assert_eq!(titv, "2.1");
        let args = ["vopt", "apply"];
        assert!(vopt_parser().try_get_matches_from(args).is_err());
    }
}
