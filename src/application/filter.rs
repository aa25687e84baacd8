// Filter engine - reduces a program to the representatives selected in the UI
use crate::domain::error::{AnalyticsError, AnalyticsResult};
use crate::domain::identifiers::RepFilter;
use crate::domain::program::ProgramData;
use crate::domain::view::{View, VolumeView};

/// Builds the rate view of `program` for `filter`.
///
/// With [`RepFilter::All`] the view is the program unchanged. With a single
/// representative the cohorts are kept and only that representative's series
/// remains; an unknown key is a `KeyNotFound` error.
pub fn reduce(program: &ProgramData, filter: &RepFilter) -> AnalyticsResult<View> {
    let reps = match filter {
        RepFilter::All => program.reps().to_vec(),
        RepFilter::Rep(rep) => {
            let series = program
                .reps()
                .iter()
                .find(|s| &s.rep == rep)
                .ok_or_else(|| AnalyticsError::rep_not_found(rep.as_str()))?;
            vec![series.clone()]
        }
    };

    Ok(View {
        program: program.id().clone(),
        title: program.title().to_string(),
        cohorts: program.cohorts().to_vec(),
        reps,
    })
}

/// Same reduction as [`reduce`], applied to the enrollment/start volumes
pub fn reduce_volume(program: &ProgramData, filter: &RepFilter) -> AnalyticsResult<VolumeView> {
    let reps = match filter {
        RepFilter::All => program.volumes().to_vec(),
        RepFilter::Rep(rep) => {
            let series = program
                .volumes()
                .iter()
                .find(|s| &s.rep == rep)
                .ok_or_else(|| AnalyticsError::rep_not_found(rep.as_str()))?;
            vec![series.clone()]
        }
    };

    Ok(VolumeView {
        program: program.id().clone(),
        title: program.title().to_string(),
        cohorts: program.cohorts().to_vec(),
        reps,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::identifiers::{ProgramId, RepId};
    use crate::domain::program::VolumeSeries;
    use crate::domain::program::fixtures::{program, rep, series};

    fn night() -> ProgramData {
        program(
            "ndt-night",
            &["NDT552NC", "NDT554NC", "NDT556NC", "NDT558NC"],
            vec![
                series("Cori", &[Some(0.0), Some(22.2), Some(0.0), Some(28.6)], 15.0),
                series("Randy", &[Some(0.0), Some(27.8), Some(11.1), Some(20.0)], 17.9),
                series("Sue", &[None, Some(0.0), Some(0.0), Some(0.0)], 0.0),
            ],
        )
    }

    #[test]
    fn all_returns_program_unchanged() {
        let program = night();
        let view = reduce(&program, &RepFilter::All).unwrap();
        assert_eq!(view.program, *program.id());
        assert_eq!(view.cohorts, program.cohorts());
        assert_eq!(view.reps, program.reps());
    }

    #[test]
    fn single_rep_keeps_every_cohort() {
        let program = night();
        for series in program.reps() {
            let view = reduce(&program, &RepFilter::Rep(series.rep.clone())).unwrap();
            assert_eq!(view.reps.len(), 1);
            assert_eq!(view.reps[0].rep, series.rep);
            assert_eq!(view.reps[0].total, series.total);
            assert_eq!(view.cohorts, program.cohorts());
        }
    }

    #[test]
    fn unknown_rep_is_rejected() {
        let err = reduce(&night(), &RepFilter::Rep(rep("Nonexistent"))).unwrap_err();
        assert_eq!(err, AnalyticsError::rep_not_found("Nonexistent"));
    }

    #[test]
    fn volume_reduction_follows_the_same_rules() {
        let program = ProgramData::new(
            ProgramId::parse("ndt-night").unwrap(),
            "NDT Night Classes".to_string(),
            vec!["NDT552NC".to_string(), "NDT554NC".to_string()],
            Vec::new(),
            vec![
                VolumeSeries::new(rep("Cori"), vec![8, 9], vec![0, 2]),
                VolumeSeries::new(rep("Thomas"), vec![4, 4], vec![0, 1]),
            ],
        )
        .unwrap();

        let all = reduce_volume(&program, &RepFilter::All).unwrap();
        assert_eq!(all.reps.len(), 2);

        let thomas = reduce_volume(&program, &RepFilter::Rep(RepId::parse("Thomas").unwrap())).unwrap();
        assert_eq!(thomas.reps, vec![VolumeSeries::new(rep("Thomas"), vec![4, 4], vec![0, 1])]);
        assert_eq!(thomas.cohorts.len(), 2);

        assert!(reduce_volume(&program, &RepFilter::Rep(rep("Sue"))).is_err());
    }
}
