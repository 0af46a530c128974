// AHP report: print criterion weights, the consistency check, and a sample
// ranking of the catalog for a site answering every question with one option.
//
// Usage: cargo run --bin ahp_report [catalog.csv] [option_code]

use crop_recommender::explanation::{format_match_breakdown, format_weights_markdown};
use crop_recommender::{
    load_catalog, map_answers_to_values, AhpModel, Criterion, Questionnaire, UserAnswer,
};
use std::path::PathBuf;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let catalog_path = args
        .next()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data/crops.csv"));
    let option_code = args.next().unwrap_or_else(|| "B".to_string());

    let model = AhpModel::initialize();

    println!("\n=== PAIRWISE COMPARISON MATRIX ===\n");
    print!("{:<12}", "");
    for col in Criterion::ALL {
        print!("{:>8}", col.as_str());
    }
    println!();
    for row in Criterion::ALL {
        print!("{:<12}", row.as_str());
        for col in Criterion::ALL {
            print!("{:>8.3}", model.matrix().get(row, col));
        }
        println!();
    }

    println!("\n=== AHP CRITERION WEIGHTS ===\n");
    println!("{}", format_weights_markdown(&model));

    let crops = load_catalog(&catalog_path)?;
    println!("Loaded {} crops from {}", crops.len(), catalog_path.display());

    let answers: Vec<UserAnswer> = Questionnaire::standard()
        .questions()
        .iter()
        .map(|q| UserAnswer::new(q.id.clone(), option_code.clone()))
        .collect();
    let values = map_answers_to_values(&answers);

    println!("\n=== SAMPLE SITE (all answers \"{}\") ===\n", option_code);
    println!("  pH:          {:.2}", values.ph);
    println!("  Rainfall:    {:.0} mm/year", values.rain);
    println!("  Temperature: {:.1} C", values.temp);
    println!("  Sun:         {:.2}", values.sun);
    println!("  Irrigation:  {:.2}", values.irrigation);
    println!("  Soil:        {}", values.soil);

    let start = Instant::now();
    let ranked = model.rank_crops_parallel(&values, &crops);
    let elapsed = start.elapsed();

    println!("\n=== RANKING ({:.3} ms) ===\n", elapsed.as_secs_f64() * 1000.0);
    for (i, rec) in ranked.iter().enumerate() {
        println!("{:>3}. {:<20} {:.4}", i + 1, rec.crop_name, rec.score);
    }

    if let Some(best) = ranked.first() {
        println!("\n{}", format_match_breakdown(best));
    }

    Ok(())
}
