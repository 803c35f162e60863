//! The cluster file. A line-oriented text format.
//!
//! ```text
//! @!ANNOTATION,<name>,<mean>,<stddev>
//! @!ALLELECOUNT,<ac>,<factor>
//! @!CLUSTER,<weight>,<mean_1>,...,<mean_d>,<cov_11>,...,<cov_1d>,...,<cov_dd>,-1
//! ```
//! The order of the annotation lines defines the column order of the other lines.
//! The covariance is flattened in row-major order. The moments of an annotation line can be
//! omitted, then the annotation is treated as already normalized.
use crate::cluster::Cluster;
use crate::data_manager::{DataManager, ANNOTATION_PREFIX};
use crate::error::{OptimizerError, Result};
use std::io::{BufRead, Write};

pub const ALLELE_COUNT_PREFIX: &str = "@!ALLELECOUNT";
pub const CLUSTER_PREFIX: &str = "@!CLUSTER";
const SENTINEL: &str = "-1";
/// The largest allele count a cluster file can carry.
pub const MAX_ALLELE_COUNT: usize = 100_000;

#[derive(Debug, Clone)]
pub struct ClusterFile {
    pub header: DataManager,
    pub allele_count_factor: Vec<f64>,
    pub clusters: Vec<Cluster>,
}

/// Write the clusters with `weight * num_variants > min_support`.
/// Allele count buckets with the default factor (1.0) are omitted.
pub fn write<W: Write>(
    wtr: &mut W,
    header: &DataManager,
    allele_count_factor: &[f64],
    clusters: &[Cluster],
    num_variants: usize,
    min_support: f64,
) -> std::io::Result<()> {
    for line in header.header_lines() {
        writeln!(wtr, "{}", line)?;
    }
    for (ac, factor) in allele_count_factor.iter().enumerate().skip(1) {
        if *factor != 1f64 {
            writeln!(wtr, "{},{},{}", ALLELE_COUNT_PREFIX, ac, factor)?;
        }
    }
    let num_variants = num_variants as f64;
    for cluster in clusters.iter() {
        if cluster.weight() * num_variants <= min_support {
            continue;
        }
        write!(wtr, "{},{},", CLUSTER_PREFIX, cluster.weight())?;
        for m in cluster.mean().iter() {
            write!(wtr, "{},", m)?;
        }
        let cov = cluster.covariance();
        for row in cov.row_iter() {
            for x in row.iter() {
                write!(wtr, "{},", x)?;
            }
        }
        writeln!(wtr, "{}", SENTINEL)?;
    }
    wtr.flush()
}

fn parse_field<T: std::str::FromStr>(field: &str, line_num: usize) -> Result<T> {
    field.trim().parse().map_err(|_| {
        OptimizerError::malformed(format!("Line {}: can not parse {}", line_num, field))
    })
}

/// Read a cluster file. Covariances are multiplied by `back_off_factor`, which should be positive.
pub fn read<R: BufRead>(rdr: R, back_off_factor: f64) -> Result<ClusterFile> {
    if !(back_off_factor.is_finite() && 0f64 < back_off_factor) {
        let message = format!("Back off factor should be positive ({})", back_off_factor);
        return Err(OptimizerError::malformed(message));
    }
    let mut keys = vec![];
    let (mut means, mut stddevs) = (vec![], vec![]);
    let mut allele_counts: Vec<(usize, f64)> = vec![];
    let mut cluster_lines: Vec<(usize, String)> = vec![];
    for (idx, line) in rdr.lines().enumerate() {
        let line = line?;
        let line_num = idx + 1;
        let fields: Vec<_> = line.split(',').collect();
        match fields[0] {
            ANNOTATION_PREFIX => match fields.len() {
                2 => {
                    keys.push(fields[1].to_string());
                    means.push(0f64);
                    stddevs.push(1f64);
                }
                4 => {
                    let mean: f64 = parse_field(fields[2], line_num)?;
                    let stddev: f64 = parse_field(fields[3], line_num)?;
                    if !(mean.is_finite() && stddev.is_finite() && 0f64 < stddev) {
                        let message = format!(
                            "Line {}: invalid moments of {} (mean = {}, stddev = {})",
                            line_num, fields[1], mean, stddev
                        );
                        return Err(OptimizerError::malformed(message));
                    }
                    keys.push(fields[1].to_string());
                    means.push(mean);
                    stddevs.push(stddev);
                }
                _ => {
                    let message = format!("Line {}: malformed annotation line", line_num);
                    return Err(OptimizerError::malformed(message));
                }
            },
            ALLELE_COUNT_PREFIX if fields.len() == 3 => {
                let ac: usize = parse_field(fields[1], line_num)?;
                let factor: f64 = parse_field(fields[2], line_num)?;
                if !(1..=MAX_ALLELE_COUNT).contains(&ac) || !factor.is_finite() {
                    let message = format!(
                        "Line {}: allele count should be in 1..={} with a finite factor",
                        line_num, MAX_ALLELE_COUNT
                    );
                    return Err(OptimizerError::malformed(message));
                }
                allele_counts.push((ac, factor));
            }
            CLUSTER_PREFIX => cluster_lines.push((line_num, line)),
            _ => {
                let message = format!("Line {}: unknown line `{}`", line_num, line);
                return Err(OptimizerError::malformed(message));
            }
        }
    }
    // Annotation lines can appear after the cluster lines.
    let dim = keys.len();
    let clusters = cluster_lines
        .iter()
        .map(|(line_num, line)| parse_cluster(line, *line_num, dim, back_off_factor))
        .collect::<Result<Vec<_>>>()?;
    let max_ac = allele_counts.iter().map(|x| x.0).max().unwrap_or(0);
    let mut allele_count_factor = vec![1f64; max_ac + 1];
    for (ac, factor) in allele_counts {
        allele_count_factor[ac] = factor;
    }
    let header = DataManager::with_moments(keys, means, stddevs);
    Ok(ClusterFile {
        header,
        allele_count_factor,
        clusters,
    })
}

fn parse_cluster(line: &str, line_num: usize, dim: usize, back_off: f64) -> Result<Cluster> {
    let fields: Vec<_> = line.split(',').skip(1).collect();
    // weight, mean, covariance, and the sentinel.
    if fields.len() != 1 + dim + dim * dim + 1 || fields.last() != Some(&SENTINEL) {
        let message = format!(
            "Line {}: a cluster line should have {} values for {} annotations, but has {}",
            line_num,
            2 + dim + dim * dim,
            dim,
            fields.len()
        );
        return Err(OptimizerError::malformed(message));
    }
    let weight: f64 = parse_field(fields[0], line_num)?;
    let mean: Vec<f64> = fields[1..1 + dim]
        .iter()
        .map(|x| parse_field::<f64>(x, line_num))
        .collect::<Result<_>>()?;
    let covariance: Vec<f64> = fields[1 + dim..1 + dim + dim * dim]
        .iter()
        .map(|x| parse_field::<f64>(x, line_num))
        .collect::<Result<_>>()?;
    let cluster = Cluster::from_parameters(weight, &mean, &covariance).map_err(|e| match e {
        OptimizerError::NumericalInstability { message, .. } => {
            let message = format!("Line {}: {}", line_num, message);
            OptimizerError::MalformedInput { message }
        }
        _ => e,
    })?;
    Ok(cluster.scale_covariance(back_off))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{DMatrix, DVector};
    fn header() -> DataManager {
        let keys = vec!["QD".to_string(), "SB".to_string(), "HRun".to_string()];
        DataManager::with_moments(keys, vec![2.5, -0.1, 1f64 / 3f64], vec![1.25, 0.01, 7f64])
    }
    fn clusters() -> Vec<Cluster> {
        let cov1 = [1.2, 0.1, 0.3, 0.1, 0.9, 0.05, 0.3, 0.05, 1.1];
        let cov2 = [0.7, 0.00001, 0.2, 0.00001, 0.5, 0.1, 0.2, 0.1, 2f64 / 3f64];
        vec![
            Cluster::from_parameters(0.6, &[0.1, -0.2, 1f64 / 7f64], &cov1).unwrap(),
            Cluster::from_parameters(0.4, &[-1.5, 0.3, 0.0000001], &cov2).unwrap(),
        ]
    }
    #[test]
    fn round_trip() {
        let (header, clusters) = (header(), clusters());
        let ac = vec![1f64, 0.5, 1f64, 2.25];
        let mut buf = vec![];
        write(&mut buf, &header, &ac, &clusters, 100, 0f64).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();
        assert_eq!(text.lines().count(), 3 + 2 + 2);
        assert!(text.lines().all(|l| l.starts_with("@!")));
        let parsed = read(std::io::Cursor::new(buf), 1f64).unwrap();
        assert_eq!(parsed.header.annotation_keys, header.annotation_keys);
        assert_eq!(parsed.header.mean, header.mean);
        assert_eq!(parsed.header.stddev, header.stddev);
        assert_eq!(parsed.allele_count_factor, ac);
        assert_eq!(parsed.clusters.len(), 2);
        for (p, c) in parsed.clusters.iter().zip(clusters.iter()) {
            assert_eq!(p.weight(), c.weight());
            assert_eq!(p.mean(), c.mean());
            assert_eq!(p.covariance(), c.covariance());
            assert_eq!(p.determinant(), c.determinant());
            let xs = [0.3, -0.7, 1.9];
            assert_eq!(p.density(&xs), c.density(&xs));
        }
    }
    #[test]
    fn pruning() {
        let header = header();
        let mut clusters = clusters();
        clusters[0].set_weight(0.9);
        clusters[1].set_weight(0.1);
        let mut buf = vec![];
        // 0.1 * 10 = 1, which is not larger than 1.
        write(&mut buf, &header, &[], &clusters, 10, 1f64).unwrap();
        let parsed = read(std::io::Cursor::new(buf), 1f64).unwrap();
        assert_eq!(parsed.clusters.len(), 1);
        assert_eq!(parsed.clusters[0].weight(), 0.9);
        let mut buf = vec![];
        write(&mut buf, &header, &[], &clusters, 11, 1f64).unwrap();
        let parsed = read(std::io::Cursor::new(buf), 1f64).unwrap();
        assert_eq!(parsed.clusters.len(), 2);
    }
    #[test]
    fn bare_annotations_and_back_off() {
        let text = "@!CLUSTER,1,0.5,-0.5,2,0,0,0.5,-1\n@!ANNOTATION,QD\n@!ANNOTATION,SB\n@!ALLELECOUNT,2,0.75\n";
        let parsed = read(text.as_bytes(), 2f64).unwrap();
        assert_eq!(parsed.header.mean, vec![0f64; 2]);
        assert_eq!(parsed.header.stddev, vec![1f64; 2]);
        assert_eq!(parsed.allele_count_factor, vec![1f64, 1f64, 0.75]);
        let cluster = &parsed.clusters[0];
        assert_eq!(cluster.mean(), &DVector::from_column_slice(&[0.5, -0.5]));
        let answer = DMatrix::from_row_slice(2, 2, &[4f64, 0f64, 0f64, 1f64]);
        assert_eq!(cluster.covariance(), &answer);
    }
    #[test]
    fn malformed() {
        let cases = [
            "@!ANNOTATION,QD\n#comment\n",
            "@!ANNOTATION,QD\n@!CLUSTER,1,0.5,1\n",
            "@!ANNOTATION,QD\n@!CLUSTER,1,0.5,1,0\n",
            "@!ANNOTATION,QD\n@!CLUSTER,1,abc,1,-1\n",
            "@!ANNOTATION,QD,1\n",
            "@!ALLELECOUNT,x,1\n",
            "@!ALLELECOUNT,1\n",
            "@!ANNOTATION,QD\n@!CLUSTER,1,0.5,0,-1\n",
            "@!ANNOTATION,QD\n@!ALLELECOUNT,18446744073709551615,0.5\n",
            "@!ANNOTATION,QD\n@!ALLELECOUNT,1000000000000,0.5\n",
            "@!ANNOTATION,QD\n@!ALLELECOUNT,0,0.5\n",
            "@!ANNOTATION,QD\n@!ALLELECOUNT,2,inf\n",
            "@!ANNOTATION,QD,1,0\n",
            "@!ANNOTATION,QD,1,-2\n",
            "@!ANNOTATION,QD,NaN,1\n",
            "@!ANNOTATION,QD,1,inf\n",
        ];
        for case in cases.iter() {
            match read(case.as_bytes(), 1f64) {
                Err(OptimizerError::MalformedInput { .. }) => {}
                x => panic!("{}\t{:?}", case, x),
            }
        }
        let text = "@!ANNOTATION,QD\n@!CLUSTER,1,0.5,1,-1\n";
        assert!(read(text.as_bytes(), 1f64).is_ok());
        for back_off in [0f64, -1f64, f64::NAN].iter() {
            assert!(read(text.as_bytes(), *back_off).is_err());
        }
        let text = format!("@!ANNOTATION,QD\n@!ALLELECOUNT,{},0.5\n", MAX_ALLELE_COUNT);
        let parsed = read(text.as_bytes(), 1f64).unwrap();
        assert_eq!(parsed.allele_count_factor.len(), MAX_ALLELE_COUNT + 1);
    }
}
