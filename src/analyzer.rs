use std::sync::Arc;

use crossbeam::channel::bounded;

use crate::{
    clip,
    map_instance::MapEntity,
    params::Params,
    reference::{ReferenceModel, DEFAULT_REFERENCE},
    sector::Sector,
    span::{AnalysisOutput, AnalysisWarning, SpanResult},
};

/// Classifies map points by the temperature sectors they touch and ranks
/// them by span.
pub struct SpanAnalyzer {
    /// Anchor and interval tables.
    reference: Arc<ReferenceModel>,
    /// One sector per interval, in interval order. Fixed for the lifetime of
    /// the analyzer since the reference model never changes.
    sectors: Vec<Sector>,
    /// Params (for easier access)
    params: Params,
}

impl SpanAnalyzer {
    pub fn new(reference: Arc<ReferenceModel>, params: Params) -> SpanAnalyzer {
        let sectors = reference.sectors();
        SpanAnalyzer {
            reference,
            sectors,
            params,
        }
    }

    /// Analyzer over the built-in anchor chain and default parameters.
    pub fn with_defaults() -> SpanAnalyzer {
        SpanAnalyzer::new(DEFAULT_REFERENCE.clone(), Params::default())
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Matches one entity against every interval. A single point matches the
    /// sectors containing it; a polygon additionally matches sectors covering
    /// more than `min_intersect_ratio` of its area.
    pub fn classify(&self, entity: &MapEntity) -> Result<SpanResult, AnalysisWarning> {
        entity.validate()?;
        let coord = entity.coord();
        if !self.reference.bounds().contains(coord) {
            log::debug!("{} lies outside the canvas at {}", entity.alias(), coord);
        }

        let mut names = Vec::new();
        for (interval, sector) in self.reference.intervals().iter().zip(self.sectors.iter()) {
            let mut hit = sector.contains(coord);
            if !hit {
                if let MapEntity::Polygon { vertices, .. } = entity {
                    let ratio = clip::intersection_ratio(vertices, sector);
                    log::debug!(
                        "Area overlap: {} {}, ratio={:.4}%",
                        entity.alias(),
                        interval,
                        ratio * 100.
                    );
                    hit = ratio > self.params.min_intersect_ratio;
                }
            }
            if hit {
                names.push(interval.name().to_string());
            }
        }

        log::debug!(
            "Classified {} coords={} intervals={}",
            entity.alias(),
            coord,
            names.join(",")
        );
        Ok(SpanResult::new(entity.alias(), names, coord))
    }

    /// Classifies every entity and ranks the results. Entities that cannot be
    /// classified get an empty span and a warning; the batch always completes.
    pub fn analyze(&self, entities: &[MapEntity]) -> AnalysisOutput {
        let n_threads = self.params.n_threads.max(1).min(entities.len().max(1));
        let parallel = n_threads > 1 && entities.len() >= self.params.parallel_threshold;
        log::info!(
            "Analyzing temperature spans of {} map points ({} threads)",
            entities.len(),
            if parallel { n_threads } else { 1 }
        );

        let results = if parallel {
            self.classify_parallel(entities, n_threads)
        } else {
            entities.iter().map(|e| self.classify(e)).collect()
        };

        let mut output = AnalysisOutput::default();
        for (entity, res) in entities.iter().zip(results) {
            match res {
                Ok(span) => output.insert(span),
                Err(warning) => {
                    log::warn!("{}", warning);
                    output.insert(SpanResult::empty(entity.alias(), entity.coord()));
                    output.warnings.push(warning);
                }
            }
        }
        output.rank(self.params.top_n);

        log::info!(
            "Temperature span analysis complete: {} map points, {} warnings",
            output.len(),
            output.warnings.len()
        );
        output
    }

    /// Spreads entities over `n_threads` workers. Results come back tagged
    /// with their index and are put back in input order.
    fn classify_parallel(
        &self,
        entities: &[MapEntity],
        n_threads: usize,
    ) -> Vec<Result<SpanResult, AnalysisWarning>> {
        let n = entities.len();
        // Channel of entity indices for workers to pick up
        let (idx_tx, idx_rx) = bounded::<usize>(n);
        for i in 0..n {
            if idx_tx.send(i).is_err() {
                break;
            }
        }
        // Closing the sender lets workers stop once the queue drains
        drop(idx_tx);

        let (res_tx, res_rx) = bounded::<(usize, Result<SpanResult, AnalysisWarning>)>(n);
        let mut slots: Vec<Option<Result<SpanResult, AnalysisWarning>>> = (0..n).map(|_| None).collect();

        let scoped = crossbeam::scope(|s| {
            for _ in 0..n_threads {
                let idx_rx = idx_rx.clone();
                let res_tx = res_tx.clone();
                s.spawn(move |_| {
                    while let Ok(i) = idx_rx.recv() {
                        log::trace!("Classifying entity {}", i);
                        if res_tx.send((i, self.classify(&entities[i]))).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(res_tx);

            for (i, res) in res_rx.iter() {
                slots[i] = Some(res);
            }
        });

        if scoped.is_err() || slots.iter().any(|s| s.is_none()) {
            log::error!("Worker pool failed; classifying serially");
            return entities.iter().map(|e| self.classify(e)).collect();
        }
        slots.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::reference::REFERENCE_INTERVALS;

    fn point(alias: &str, x: f64, y: f64) -> MapEntity {
        MapEntity::Point {
            alias: alias.to_string(),
            coord: Point::new(x, y),
        }
    }

    fn square(alias: &str, cx: f64, cy: f64, half: f64) -> MapEntity {
        MapEntity::Polygon {
            alias: alias.to_string(),
            centroid: Point::new(cx, cy),
            vertices: vec![
                Point::new(cx - half, cy - half),
                Point::new(cx + half, cy - half),
                Point::new(cx + half, cy + half),
                Point::new(cx - half, cy + half),
            ],
        }
    }

    fn analyzer_with_threads(n_threads: usize, parallel_threshold: usize) -> SpanAnalyzer {
        let params = Params {
            n_threads,
            parallel_threshold,
            ..Params::default()
        };
        SpanAnalyzer::new(DEFAULT_REFERENCE.clone(), params)
    }

    /// Deterministic mix of points and polygons across the canvas.
    fn sample_entities(n: usize) -> Vec<MapEntity> {
        (0..n)
            .map(|i| {
                let x = 0.05 + (i as f64 * 0.37) % 2.4;
                let y = 0.05 + (i as f64 * 0.23) % 1.6;
                if i % 3 == 0 {
                    square(&format!("poly_{i:03}"), x, y, 0.02 + (i % 7) as f64 * 0.03)
                } else {
                    point(&format!("pt_{i:03}"), x, y)
                }
            })
            .collect()
    }

    #[test]
    fn point_between_d65_and_d50() {
        let analyzer = SpanAnalyzer::with_defaults();
        let span = analyzer.classify(&point("mid", 0.48, 0.68)).unwrap();
        assert!(span.interval_names.contains(&"D65-D50".to_string()));
        assert_eq!(span.count, span.interval_names.len());
        assert_eq!(span.coords, Point::new(0.48, 0.68));
    }

    #[test]
    fn far_polygon_matches_nothing() {
        let analyzer = SpanAnalyzer::with_defaults();
        let span = analyzer.classify(&square("far", 10.0, 10.0, 0.005)).unwrap();
        assert_eq!(span.count, 0);
        assert!(span.interval_names.is_empty());
    }

    #[test]
    fn polygon_matches_by_area_when_centroid_misses() {
        let analyzer = SpanAnalyzer::with_defaults();
        let d65_d50 = DEFAULT_REFERENCE.sector_between("D65", "D50").unwrap();
        // centroid in D75-D65, square reaching into both neighbours
        let entity = square("wide", 0.53, 0.796, 0.08);
        assert!(!d65_d50.contains(entity.coord()));
        assert!(clip::intersection_ratio(entity.vertices(), &d65_d50) > 0.01);

        let span = analyzer.classify(&entity).unwrap();
        assert_eq!(span.interval_names, vec!["High-D75", "D75-D65", "D65-D50"]);
        assert_eq!(span.count, 3);
    }

    #[test]
    fn threshold_controls_polygon_matches() {
        let params = Params {
            min_intersect_ratio: 0.5,
            ..Params::default()
        };
        let strict = SpanAnalyzer::new(DEFAULT_REFERENCE.clone(), params);
        let span = strict.classify(&square("wide", 0.53, 0.796, 0.08)).unwrap();
        assert_eq!(span.interval_names, vec!["D75-D65"]);

        // single points never use the area test
        let span = strict.classify(&point("pt", 0.53, 0.796)).unwrap();
        assert_eq!(span.interval_names, vec!["D75-D65"]);
    }

    #[test]
    fn matched_names_are_known_and_in_table_order() {
        let analyzer = SpanAnalyzer::with_defaults();
        let known: Vec<String> = REFERENCE_INTERVALS.iter().map(|(a, b)| format!("{a}-{b}")).collect();
        let out = analyzer.analyze(&sample_entities(90));
        for span in out.iter() {
            let positions: Vec<usize> = span
                .interval_names
                .iter()
                .map(|n| known.iter().position(|k| k == n).expect("unknown interval name"))
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", span.interval_names);
        }
    }

    #[test]
    fn malformed_entities_degrade_to_empty_spans() {
        let analyzer = SpanAnalyzer::with_defaults();
        let entities = vec![
            point("ok", 0.48, 0.68),
            MapEntity::Polygon {
                alias: "hollow".into(),
                centroid: Point::new(0.48, 0.68),
                vertices: vec![],
            },
            point("nan", f64::NAN, 0.5),
        ];
        let out = analyzer.analyze(&entities);
        assert_eq!(out.len(), 3);
        assert!(out.get("ok").unwrap().count > 0);
        assert_eq!(out.get("hollow").unwrap().count, 0);
        assert_eq!(out.get("nan").unwrap().count, 0);
        assert_eq!(out.warnings.len(), 2);
        assert_eq!(out.warnings[0].alias(), "hollow");
        assert_eq!(out.warnings[1].alias(), "nan");
    }

    #[test]
    fn top_list_is_bounded_and_sorted() {
        let analyzer = SpanAnalyzer::with_defaults();
        let out = analyzer.analyze(&sample_entities(60));
        assert_eq!(out.top.len(), 20);
        for w in out.top.windows(2) {
            assert!(w[0].count > w[1].count || (w[0].count == w[1].count && w[0].alias < w[1].alias));
        }
        let min_top = out.top.last().unwrap().count;
        let outside = out.iter().filter(|s| !out.top.iter().any(|t| t.alias == s.alias));
        for span in outside {
            assert!(span.count <= min_top);
        }
    }

    #[test]
    fn equal_counts_rank_by_alias() {
        let analyzer = SpanAnalyzer::with_defaults();
        let out = analyzer.analyze(&[point("b", 0.48, 0.68), point("a", 0.48, 0.68), point("c", 10.0, 10.0)]);
        let aliases: Vec<&str> = out.top.iter().map(|s| s.alias.as_str()).collect();
        assert_eq!(aliases, vec!["a", "b", "c"]);
    }

    #[test]
    fn repeated_analysis_is_identical() {
        let analyzer = SpanAnalyzer::with_defaults();
        let entities = sample_entities(120);
        let first = analyzer.analyze(&entities);
        let second = analyzer.analyze(&entities);
        assert_eq!(first, second);
    }

    #[test]
    fn parallel_matches_serial() {
        let entities = sample_entities(200);
        let serial = analyzer_with_threads(1, usize::MAX).analyze(&entities);
        let parallel = analyzer_with_threads(4, 1).analyze(&entities);
        assert_eq!(serial, parallel);
        assert_eq!(serial.order, parallel.order);
    }

    #[test]
    fn empty_batch() {
        let out = analyzer_with_threads(4, 0).analyze(&[]);
        assert!(out.is_empty());
        assert!(out.top.is_empty());
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn fan_interior_is_covered() {
        // The fan leaves out the canvas corner below the F-A base edge and the
        // sliver right of the 100K ray; sweep the region between them.
        let analyzer = SpanAnalyzer::with_defaults();
        let mut entities = Vec::new();
        for i in 0..60 {
            for j in 0..50 {
                let x = 0.3 + 2.1 * (i as f64 + 0.5) / 60.;
                let y = 0.02 + 1.66 * (j as f64 + 0.5) / 50.;
                entities.push(point(&format!("g{i}_{j}"), x, y));
            }
        }
        let out = analyzer.analyze(&entities);
        for span in out.iter() {
            assert!(span.count >= 1, "{} not covered", span);
        }
    }

    #[test]
    fn demo_map_file() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/sample.map");
        let instance = crate::map_instance::MapInstance::load(path).unwrap();
        assert_eq!(instance.entities.len(), 7);

        let out = SpanAnalyzer::with_defaults().analyze(&instance.entities);
        assert!(out.warnings.is_empty());
        assert_eq!(
            out.get("Daylight_Region").unwrap().interval_names,
            vec!["High-D75", "D75-D65", "D65-D50"]
        );
        assert_eq!(out.get("Offcanvas_Region").unwrap().count, 0);
        assert_eq!(out.top[0].alias, "Daylight_Region");
        assert_eq!(out.top.last().unwrap().alias, "Offcanvas_Region");
    }
}
