//! Ordinary least squares with an intercept.

use nalgebra::{DMatrix, DVector};
use statrs::distribution::{ContinuousCDF, StudentsT};
use thiserror::Error;

/// Name of the intercept term in coefficient maps.
pub const INTERCEPT: &str = "const";

/// A fitted model; vectors are indexed like `terms`, intercept first.
#[derive(Debug, Clone, PartialEq)]
pub struct OlsFit {
    pub terms: Vec<String>,
    pub coefficients: Vec<f64>,
    pub std_errors: Vec<Option<f64>>,
    pub t_values: Vec<Option<f64>>,
    pub p_values: Vec<Option<f64>>,
    pub rsquared: Option<f64>,
    pub nobs: usize,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OlsError {
    #[error("no complete observations")]
    NoObservations,

    #[error("design matrix is singular")]
    Singular,
}

/// Fits `y = b0 + b1 * x1 + ...`.
///
/// `predictors` pairs each term name with its values; every slice must have
/// the length of `y`. Standard errors and p-values are `None` when there
/// are no residual degrees of freedom.
pub fn fit(y: &[f64], predictors: &[(String, Vec<f64>)]) -> Result<OlsFit, OlsError> {
    let n = y.len();
    if n == 0 {
        return Err(OlsError::NoObservations);
    }
    let k = predictors.len() + 1;

    let x = DMatrix::from_fn(n, k, |row, col| match col {
        0 => 1.0,
        _ => predictors[col - 1].1[row],
    });
    let y = DVector::from_column_slice(y);

    let svd = x.clone().svd(false, false);
    let tolerance = svd.singular_values.max() * n.max(k) as f64 * f64::EPSILON;
    if svd.rank(tolerance) < k {
        return Err(OlsError::Singular);
    }

    let xtx = x.transpose() * &x;
    let xtx_inv = xtx.try_inverse().ok_or(OlsError::Singular)?;
    let beta = &xtx_inv * x.transpose() * &y;
    if beta.iter().any(|b| !b.is_finite()) {
        return Err(OlsError::Singular);
    }

    let residuals = &y - &x * &beta;
    let ssr = residuals.norm_squared();
    let mean = y.mean();
    let tss: f64 = y.iter().map(|v| (v - mean).powi(2)).sum();
    let rsquared = (tss > 0.0).then(|| 1.0 - ssr / tss);

    let df = n.saturating_sub(k);
    let (std_errors, t_values, p_values) = if df > 0 {
        let sigma2 = ssr / df as f64;
        let dist = StudentsT::new(0.0, 1.0, df as f64).ok();

        let mut std_errors = Vec::with_capacity(k);
        let mut t_values = Vec::with_capacity(k);
        let mut p_values = Vec::with_capacity(k);
        for j in 0..k {
            let se = (sigma2 * xtx_inv[(j, j)]).sqrt();
            let se = se.is_finite().then_some(se);
            let t = se.filter(|se| *se > 0.0).map(|se| beta[j] / se);
            let p = match (t, &dist) {
                (Some(t), Some(dist)) => Some(2.0 * (1.0 - dist.cdf(t.abs()))),
                _ => None,
            };
            std_errors.push(se);
            t_values.push(t);
            p_values.push(p);
        }
        (std_errors, t_values, p_values)
    } else {
        (vec![None; k], vec![None; k], vec![None; k])
    };

    let terms = std::iter::once(INTERCEPT.to_string())
        .chain(predictors.iter().map(|(name, _)| name.clone()))
        .collect();

    Ok(OlsFit {
        terms,
        coefficients: beta.iter().copied().collect(),
        std_errors,
        t_values,
        p_values,
        rsquared,
        nobs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn exact_line_is_recovered() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 + 2.0 * v).collect();
        let fit = fit(&y, &[("x".into(), x)]).unwrap();

        assert_eq!(fit.terms, vec!["const".to_string(), "x".to_string()]);
        assert!(close(fit.coefficients[0], 3.0));
        assert!(close(fit.coefficients[1], 2.0));
        assert!(close(fit.rsquared.unwrap(), 1.0));
        assert_eq!(fit.nobs, 4);
    }

    #[test]
    fn noisy_fit_has_p_values() {
        let x = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let y = vec![2.1, 3.9, 6.2, 7.8, 10.1];
        let fit = fit(&y, &[("x".into(), x)]).unwrap();

        let p = fit.p_values[1].unwrap();
        assert!(p > 0.0 && p < 0.001);
        assert!(fit.std_errors[1].unwrap() > 0.0);
    }

    #[test]
    fn intercept_only_model_is_the_mean() {
        let fit = fit(&[1.0, 2.0, 6.0], &[]).unwrap();
        assert_eq!(fit.terms, vec!["const".to_string()]);
        assert!(close(fit.coefficients[0], 3.0));
    }

    #[test]
    fn collinear_predictors_are_singular() {
        let x = vec![1.0, 2.0, 3.0];
        let result = fit(
            &[1.0, 2.0, 3.0],
            &[("a".into(), x.clone()), ("b".into(), x)],
        );
        assert_eq!(result, Err(OlsError::Singular));
    }
}
