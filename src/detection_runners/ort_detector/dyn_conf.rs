/// Per-class confidence thresholds.
///
/// When fewer thresholds than classes are given, the last one applies to the
/// remaining classes.
#[derive(Debug, Clone, PartialEq)]
pub struct DynConf(Vec<f32>);

impl DynConf {
    pub fn new(confs: &[f32], nc: usize) -> Self {
        let fill = confs.last().copied().unwrap_or(0.25);
        let mut xs: Vec<f32> = confs.iter().copied().take(nc).collect();
        xs.resize(nc, fill);
        Self(xs)
    }

    pub fn get(&self, class_id: usize) -> Option<f32> {
        self.0.get(class_id).copied()
    }
}

impl std::ops::Index<usize> for DynConf {
    type Output = f32;

    fn index(&self, i: usize) -> &Self::Output {
        &self.0[i]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_with_last_threshold() {
        let confs = DynConf::new(&[0.5, 0.3], 4);
        assert_eq!(confs[0], 0.5);
        assert_eq!(confs[1], 0.3);
        assert_eq!(confs[3], 0.3);
        assert_eq!(confs.get(4), None);
    }
}
