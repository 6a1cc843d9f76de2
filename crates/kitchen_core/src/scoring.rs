use crate::{Constants, FoodDef, ScoreState};

impl FoodDef {
    /// Points for serving this food at `quality`.
    pub fn points_for(&self, quality: f32, constants: &Constants) -> u32 {
        if quality >= constants.perfect_quality_threshold {
            self.perfect_points
        } else if quality >= constants.good_quality_threshold {
            self.good_points
        } else {
            self.late_points
        }
    }
}

impl ScoreState {
    /// Mean quality of correctly served portions, 0 when nothing was served.
    pub fn average_quality(&self) -> f32 {
        if self.served == 0 {
            return 0.0;
        }
        self.quality_sum / self.served as f32
    }
}
