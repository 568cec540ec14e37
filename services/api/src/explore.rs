use crate::infra::{parse_metric, DatasetArgs, FilterParams};
use clap::Args;
use volcano_atlas::atlas::views::{self, CountryBreakdown};
use volcano_atlas::atlas::{AtlasCache, FilteredView, MapMetric, VolcanoAtlas};
use volcano_atlas::config::AppConfig;
use volcano_atlas::error::AppError;
use volcano_atlas::telemetry::{self, LogSink};

#[derive(Args, Debug)]
pub(crate) struct ExploreArgs {
    #[command(flatten)]
    pub(crate) filters: FilterParams,
    /// Map metric used for marker size: "elevation" or "danger"
    #[arg(long, value_parser = parse_metric, default_value = "elevation")]
    pub(crate) metric: MapMetric,
    /// Number of countries in the breakdown
    #[arg(long, default_value_t = 10)]
    pub(crate) top: usize,
    /// Print every visible volcano
    #[arg(long)]
    pub(crate) show_rows: bool,
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
}

#[derive(Args, Debug)]
pub(crate) struct CheckArgs {
    #[command(flatten)]
    pub(crate) dataset: DatasetArgs,
}

pub(crate) fn run_explore(args: ExploreArgs) -> Result<(), AppError> {
    let ExploreArgs {
        filters,
        metric,
        top,
        show_rows,
        dataset,
    } = args;

    let atlas = load_atlas(dataset)?;
    let view = atlas.filter(&filters.to_spec(atlas.bounds()));
    render_exploration(&atlas, &view, metric, top, show_rows);
    Ok(())
}

pub(crate) fn run_check(args: CheckArgs) -> Result<(), AppError> {
    let atlas = load_atlas(args.dataset)?;
    let options = atlas.options();
    println!(
        "Dataset OK: {} volcanoes, {} types, {} statuses, {} boundary features",
        atlas.volcanoes().len(),
        options.types.len().saturating_sub(1),
        options.statuses.len().saturating_sub(1),
        atlas.boundaries().feature_count()
    );
    Ok(())
}

fn load_atlas(dataset: DatasetArgs) -> Result<std::sync::Arc<VolcanoAtlas>, AppError> {
    let mut config = AppConfig::load()?;
    dataset.apply(&mut config.dataset);
    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    AtlasCache::global()
        .get_or_load(&config.dataset)
        .map_err(AppError::from)
}

pub(crate) fn render_exploration(
    atlas: &VolcanoAtlas,
    view: &FilteredView<'_>,
    metric: MapMetric,
    top: usize,
    show_rows: bool,
) {
    println!("Volcano Data Exploration");
    println!("{}", atlas.summary(view));

    for warning in &view.range_errors {
        println!("Warning: {}", warning);
    }

    let points = views::map_points(view, metric);
    println!(
        "\nMap ({}): {} markers ({} without coordinates)",
        metric.label(),
        points.len(),
        view.len() - points.len()
    );

    let breakdown = views::country_breakdown(view, Some(top));
    if breakdown.is_empty() {
        println!("\nTop countries: none");
    } else {
        println!("\nTop {} countries", breakdown.len());
        for country in &breakdown {
            println!("- {}", describe_country(country));
        }
    }

    if show_rows {
        println!("\nVolcanoes");
        for row in views::order_by_recency(view) {
            let volcano = row.volcano;
            println!(
                "- {} ({}), {} | {} / {} | elev {} m | pop {} | danger {:.4}",
                volcano.name,
                volcano.number,
                volcano.country,
                volcano.status,
                volcano.last_known,
                volcano.elevation,
                volcano.population_2020,
                volcano.danger_score
            );
        }
    }
}

fn describe_country(country: &CountryBreakdown) -> String {
    let codes = country
        .by_last_known
        .iter()
        .map(|entry| format!("{} {}", entry.last_known, entry.count))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}: {} volcanoes ({})", country.country, country.total, codes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use volcano_atlas::atlas::views::LastKnownCount;

    #[test]
    fn country_line_lists_recency_counts() {
        let country = CountryBreakdown {
            country: "Italy".to_string(),
            total: 3,
            by_last_known: vec![
                LastKnownCount {
                    last_known: "D1",
                    count: 2,
                },
                LastKnownCount {
                    last_known: "D2",
                    count: 1,
                },
            ],
        };
        assert_eq!(describe_country(&country), "Italy: 3 volcanoes (D1 2, D2 1)");
    }
}
