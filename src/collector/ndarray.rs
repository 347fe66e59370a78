use ::ndarray;
use serde::Serialize;
use std::marker::PhantomData;

use crate::constants::*;
use crate::*;

struct CollectedRow {
    player_count: usize,
    values: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NDArrayMeta {
    pub column_headers: Vec<String>,
    pub entity_order: Vec<EntityId>,
}

/// Stacks the mirror's feature vector from every processed tick into a 2D
/// array. Players who enter mid-match get their columns from the start; rows
/// recorded before they appeared hold an off-pitch sentinel position and zero
/// velocity in those columns.
pub struct NDArrayCollector<F> {
    include_velocity: bool,
    rows: Vec<CollectedRow>,
    entity_order: Vec<EntityId>,
    _float: PhantomData<F>,
}

impl<F> NDArrayCollector<F> {
    pub fn new(include_velocity: bool) -> Self {
        Self {
            include_velocity,
            rows: Vec::new(),
            entity_order: Vec::new(),
            _float: PhantomData,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn blocks(&self) -> usize {
        if self.include_velocity {
            2
        } else {
            1
        }
    }

    pub fn get_column_headers(&self) -> Vec<String> {
        let mut headers: Vec<String> = ["time", "period", "home score", "away score", "possession"]
            .iter()
            .map(|h| h.to_string())
            .collect();
        let mut add_block = |x: &str, y: &str| {
            for id in self.entity_order.iter() {
                headers.push(format!("{} {}", id, x));
                headers.push(format!("{} {}", id, y));
            }
            headers.push(format!("ball {}", x));
            headers.push(format!("ball {}", y));
        };
        add_block("x", "y");
        if self.include_velocity {
            add_block("vx", "vy");
        }
        headers
    }
}

impl<F: TryFrom<f32>> NDArrayCollector<F>
where
    <F as TryFrom<f32>>::Error: std::fmt::Debug,
{
    pub fn build_ndarray(
        match_data: &MatchData,
        config: ReplayConfig,
        include_velocity: bool,
        dt: f64,
    ) -> MatchReplayResult<(NDArrayMeta, ndarray::Array2<F>)> {
        let mut collector = Self::new(include_velocity);
        MatchProcessor::new(match_data, config)?.process(&mut collector, dt)?;
        collector.get_meta_and_ndarray()
    }

    pub fn get_meta_and_ndarray(self) -> MatchReplayResult<(NDArrayMeta, ndarray::Array2<F>)> {
        let meta = NDArrayMeta {
            column_headers: self.get_column_headers(),
            entity_order: self.entity_order.clone(),
        };
        Ok((meta, self.get_ndarray()?))
    }

    pub fn get_ndarray(self) -> MatchReplayResult<ndarray::Array2<F>> {
        let players = self.entity_order.len();
        let blocks = self.blocks();
        let width = FEATURE_HEADER_LEN + (players + 1) * 2 * blocks;
        let mut data = Vec::with_capacity(width * self.rows.len());

        for row in self.rows.iter() {
            let block = (row.player_count + 1) * 2;
            let expected = FEATURE_HEADER_LEN + block * blocks;
            if row.values.len() != expected || row.player_count > players {
                return MatchReplayError::new_result(
                    MatchReplayErrorVariant::InconsistentRowWidth {
                        expected,
                        found: row.values.len(),
                    },
                );
            }
            let mut padded = Vec::with_capacity(width);
            padded.extend_from_slice(&row.values[..FEATURE_HEADER_LEN]);
            let positions = &row.values[FEATURE_HEADER_LEN..FEATURE_HEADER_LEN + block];
            pad_block(&mut padded, positions, row.player_count, players, OFF_PITCH_SENTINEL);
            if self.include_velocity {
                let velocities = &row.values[FEATURE_HEADER_LEN + block..];
                pad_block(&mut padded, velocities, row.player_count, players, 0.0);
            }
            for value in padded {
                data.push(F::try_from(value).map_err(|_| {
                    MatchReplayError::new(MatchReplayErrorVariant::FloatConversionError)
                })?);
            }
        }

        Ok(ndarray::Array2::from_shape_vec(
            (self.rows.len(), width),
            data,
        )?)
    }
}

/// Copy one `(player rows..., ball row)` block, inserting `fill` rows for
/// players registered after this row was taken.
fn pad_block(out: &mut Vec<f32>, block: &[f32], present: usize, total: usize, fill: f32) {
    let split = present * 2;
    out.extend_from_slice(&block[..split]);
    out.extend(std::iter::repeat(fill).take((total - present) * 2));
    out.extend_from_slice(&block[split..]);
}

impl<F> Collector for NDArrayCollector<F> {
    fn process_tick(
        &mut self,
        processor: &MatchProcessor,
        _tick: usize,
        _current_time: f64,
    ) -> MatchReplayResult<TimeAdvance> {
        let mirror = processor.mirror();
        if mirror.num_players() > self.entity_order.len() {
            self.entity_order = mirror.entity_order().to_vec();
        }
        self.rows.push(CollectedRow {
            player_count: mirror.num_players(),
            values: mirror.to_vector(self.include_velocity).to_vec(),
        });
        Ok(TimeAdvance::NextTick)
    }
}
