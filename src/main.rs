use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod export;
mod loader;
mod models;
mod plot;

#[derive(Parser)]
#[command(name = "eva-analysis")]
#[command(about = "Cumulative spacewalk duration pipeline for NASA EVA data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: clean, export CSV, render the chart
    Run {
        #[arg(long, default_value = "./eva_data.json")]
        input: PathBuf,
        #[arg(long, default_value = "./eva_data.csv")]
        csv: PathBuf,
        #[arg(long, default_value = "./cumulative_eva_graph.png")]
        graph: PathBuf,
    },
    /// Write the cleaned dataset to a CSV file
    Export {
        #[arg(long, default_value = "./eva_data.json")]
        input: PathBuf,
        #[arg(long, default_value = "./eva_data.csv")]
        csv: PathBuf,
    },
    /// Render the cumulative-duration chart
    Plot {
        #[arg(long, default_value = "./eva_data.json")]
        input: PathBuf,
        #[arg(long, default_value = "./cumulative_eva_graph.png")]
        graph: PathBuf,
    },
    /// Print dataset totals
    Summary {
        #[arg(long, default_value = "./eva_data.json")]
        input: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input, csv, graph } => {
            println!("Reading data from {}", input.display());
            let mut dataset = loader::read_json_dataset(&input)?;
            println!(
                "Saving {} cleaned records to {}",
                dataset.records.len(),
                csv.display()
            );
            export::write_csv(&dataset, &csv)?;

            plot::sort_by_date(&mut dataset);
            let points = plot::cumulative_series(&dataset)?;
            println!(
                "Plotting cumulative spacewalk duration to {}",
                graph.display()
            );
            plot::render_chart(&points, &graph)?;
        }
        Commands::Export { input, csv } => {
            let dataset = loader::read_json_dataset(&input)?;
            export::write_csv(&dataset, &csv)?;
            println!(
                "Saved {} cleaned records to {}",
                dataset.records.len(),
                csv.display()
            );
        }
        Commands::Plot { input, graph } => {
            let mut dataset = loader::read_json_dataset(&input)?;
            plot::sort_by_date(&mut dataset);
            let points = plot::cumulative_series(&dataset)?;
            plot::render_chart(&points, &graph)?;
            println!("Chart written to {}", graph.display());
        }
        Commands::Summary { input } => {
            let mut dataset = loader::read_json_dataset(&input)?;
            plot::sort_by_date(&mut dataset);
            let points = plot::cumulative_series(&dataset)?;

            let schema: Vec<String> = dataset
                .columns
                .iter()
                .map(|column| format!("{} ({})", column.name, column.kind))
                .collect();

            println!("Spacewalk dataset summary:");
            println!("- {} cleaned records", dataset.records.len());
            println!("- columns: {}", schema.join(", "));
            match (points.first(), points.last()) {
                (Some(first), Some(last)) => {
                    let longest = points
                        .iter()
                        .map(|point| point.duration_hours)
                        .fold(0.0, f64::max);
                    println!("- first walk {}, latest walk {}", first.date, last.date);
                    println!(
                        "- {:.2} hours spent in space in total, longest single walk {:.2}",
                        last.cumulative_hours, longest
                    );
                }
                _ => println!("- no dated records to summarize"),
            }
        }
    }

    Ok(())
}
