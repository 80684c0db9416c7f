use std::time::Duration;

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::config::ScrapeOptions;
use crate::item::SocialProofItem;

fn item_to_dict<'py>(py: Python<'py>, item: &SocialProofItem) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("celebrity", &item.celebrity)?;
    dict.set_item("event", item.event.as_deref())?;
    dict.set_item("outfitDescription", &item.outfit_description)?;
    dict.set_item("imageUrl", item.image_url.as_deref())?;
    dict.set_item("timestamp", &item.timestamp)?;
    dict.set_item("outfitTags", &item.outfit_tags)?;
    dict.set_item("colors", &item.colors)?;
    dict.set_item("patterns", &item.patterns)?;
    dict.set_item("styles", &item.styles)?;
    dict.set_item("confidenceScore", item.confidence_score)?;
    Ok(dict)
}

#[pyfunction]
#[pyo3(signature = (item_limit=None, timeout_secs=None, retry_attempts=None, headless=None))]
fn extract_social_proof(
    py: Python,
    item_limit: Option<usize>,
    timeout_secs: Option<f64>,
    retry_attempts: Option<u32>,
    headless: Option<bool>,
) -> PyResult<PyObject> {
    let mut options = ScrapeOptions::from_env();
    if let Some(limit) = item_limit {
        options = options.with_item_limit(limit);
    }
    if let Some(secs) = timeout_secs.filter(|s| *s > 0.0) {
        options = options.with_timeout(Duration::from_secs_f64(secs));
    }
    if let Some(attempts) = retry_attempts {
        options = options.with_retry_attempts(attempts);
    }
    if let Some(headless) = headless {
        options = options.with_headless(headless);
    }

    let items = py.allow_threads(|| {
        tokio::runtime::Runtime::new()
            .map(|rt| rt.block_on(crate::extract_social_proof(options)))
            .map_err(|e| e.to_string())
    });
    let items = items.map_err(pyo3::exceptions::PyRuntimeError::new_err)?;

    let list = PyList::empty_bound(py);
    for item in &items {
        list.append(item_to_dict(py, item)?)?;
    }
    Ok(list.into())
}

#[pymodule]
fn social_proof(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(extract_social_proof, m)?)?;
    Ok(())
}
