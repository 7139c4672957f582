use std::error::Error;

use plotters::prelude::*;

use crate::indexed;

/// Plot the ground truth and optionally a prediction of the same series into a png
pub fn visual(
    truth: &[f64],
    preds: Option<&[f64]>,
    filename: &str,
    dims: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    if truth.is_empty() {
        return Err("nothing to plot, ground truth is empty".into());
    }
    let len = truth.len().max(preds.map(|p| p.len()).unwrap_or(0));

    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;
    for v in truth.iter().chain(preds.unwrap_or(&[]).iter()) {
        y_min = y_min.min(*v);
        y_max = y_max.max(*v);
    }
    if y_min == y_max {
        y_min -= 1.0;
        y_max += 1.0;
    }
    info!("len: {}, y_min: {}, y_max: {}", len, y_min, y_max);

    let root_area = BitMapBackend::new(filename, dims).into_drawing_area();
    root_area.fill(&WHITE)?;

    let mut cc0 = ChartBuilder::on(&root_area)
        .margin(5)
        .set_all_label_area_size(50)
        .caption(filename, ("sans-serif", 20).into_font().with_color(&BLACK))
        .build_cartesian_2d(0.0..(len - 1).max(1) as f64, y_min..y_max)?;
    cc0.configure_mesh()
        .x_labels(20)
        .y_labels(20)
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.4}", v))
        .draw()?;

    cc0.draw_series(LineSeries::new(indexed(truth), &BLACK))?
        .label("GroundTruth")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));
    if let Some(preds) = preds {
        cc0.draw_series(LineSeries::new(indexed(preds), &RED))?
            .label("Prediction")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    }
    cc0.configure_series_labels().border_style(&BLACK).draw()?;
    root_area.present()?;

    info!("successfully plotted to {}", filename);

    Ok(())
}
