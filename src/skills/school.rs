//! Night school courses, study sessions and exams

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::core::error::{GameError, GameResult};
use crate::core::state::{GameState, Skill};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn base_rate(self) -> f64 {
        match self {
            Self::Easy => 0.8,
            Self::Medium => 0.6,
            Self::Hard => 0.4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, Display)]
pub enum CourseKind {
    #[strum(to_string = "First Aid")]
    FirstAid,
    Communication,
    #[strum(to_string = "Traffic Safety")]
    TrafficSafety,
    #[strum(to_string = "Customer Service")]
    CustomerService,
    #[strum(to_string = "Financial Planning")]
    FinancialPlanning,
    #[strum(to_string = "Spoken English")]
    English,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub kind: CourseKind,
    pub name: &'static str,
    pub hours: u32,
    pub cost: f64,
    pub difficulty: Difficulty,
    pub bonuses: &'static [(Skill, u32)],
    pub requirements: &'static [(Skill, u32)],
    pub description: &'static str,
}

impl Course {
    pub fn required_minutes(&self) -> u32 {
        self.hours * 60
    }

    pub fn check_requirements(&self, state: &GameState) -> GameResult<()> {
        self.requirements
            .iter()
            .try_for_each(|&(skill, level)| state.attributes.require(skill, level))
    }
}

static COURSES: [Course; 6] = [
    Course {
        kind: CourseKind::FirstAid,
        name: "First Aid Training",
        hours: 20,
        cost: 200.0,
        difficulty: Difficulty::Easy,
        bonuses: &[(Skill::FirstAid, 3), (Skill::CustomerService, 1)],
        requirements: &[],
        description: "Basic first aid, fewer disputes on hospital orders",
    },
    Course {
        kind: CourseKind::Communication,
        name: "Communication Psychology",
        hours: 30,
        cost: 400.0,
        difficulty: Difficulty::Medium,
        bonuses: &[(Skill::EmotionalIntelligence, 2), (Skill::Communication, 3)],
        requirements: &[],
        description: "Better people skills, fewer complaints",
    },
    Course {
        kind: CourseKind::TrafficSafety,
        name: "Traffic Safety",
        hours: 15,
        cost: 150.0,
        difficulty: Difficulty::Easy,
        bonuses: &[(Skill::TrafficSafety, 3), (Skill::DirectionSense, 1)],
        requirements: &[],
        description: "Safer riding, lower accident risk",
    },
    Course {
        kind: CourseKind::CustomerService,
        name: "Customer Service Skills",
        hours: 25,
        cost: 300.0,
        difficulty: Difficulty::Medium,
        bonuses: &[(Skill::CustomerService, 3), (Skill::EmotionalIntelligence, 1)],
        requirements: &[(Skill::Communication, 2)],
        description: "Professional service, happier customers",
    },
    Course {
        kind: CourseKind::FinancialPlanning,
        name: "Personal Financial Planning",
        hours: 40,
        cost: 600.0,
        difficulty: Difficulty::Hard,
        bonuses: &[(Skill::FinancialManagement, 4), (Skill::EducationLevel, 1)],
        requirements: &[(Skill::EducationLevel, 3)],
        description: "Investing basics for healthier finances",
    },
    Course {
        kind: CourseKind::English,
        name: "Spoken English",
        hours: 50,
        cost: 800.0,
        difficulty: Difficulty::Hard,
        bonuses: &[(Skill::LanguageSkills, 4), (Skill::CustomerService, 2)],
        requirements: &[(Skill::EducationLevel, 2)],
        description: "Serve foreign customers with confidence",
    },
];

impl CourseKind {
    pub fn course(self) -> &'static Course {
        match self {
            Self::FirstAid => &COURSES[0],
            Self::Communication => &COURSES[1],
            Self::TrafficSafety => &COURSES[2],
            Self::CustomerService => &COURSES[3],
            Self::FinancialPlanning => &COURSES[4],
            Self::English => &COURSES[5],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudySession {
    pub timestamp: NaiveDateTime,
    pub minutes: u32,
    pub effectiveness: f64,
    pub experience: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub kind: CourseKind,
    pub enrolled: bool,
    pub completed: bool,
    pub sessions: Vec<StudySession>,
}

impl CourseProgress {
    pub fn studied_minutes(&self) -> u32 {
        self.sessions.iter().map(|s| s.minutes).sum()
    }

    pub fn mean_effectiveness(&self) -> f64 {
        if self.sessions.is_empty() {
            return 0.5;
        }
        self.sessions.iter().map(|s| s.effectiveness).sum::<f64>() / self.sessions.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudyReport {
    pub minutes: u32,
    pub effectiveness: f64,
    pub experience: u32,
    pub stamina_cost: u32,
    pub levels_gained: u32,
    pub total_minutes: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExamResult {
    pub passed: bool,
    pub probability: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NightSchool {
    progress: Vec<CourseProgress>,
}

impl Default for NightSchool {
    fn default() -> Self {
        Self {
            progress: CourseKind::iter()
                .map(|kind| CourseProgress {
                    kind,
                    enrolled: false,
                    completed: false,
                    sessions: Vec::new(),
                })
                .collect(),
        }
    }
}

impl NightSchool {
    pub const MAX_SESSION_MINUTES: u32 = 180;

    pub fn courses() -> &'static [Course] {
        &COURSES
    }

    pub fn progress(&self, kind: CourseKind) -> Option<&CourseProgress> {
        self.progress.iter().find(|p| p.kind == kind)
    }

    fn progress_mut(&mut self, kind: CourseKind) -> &mut CourseProgress {
        // Older saves may lack a course
        let index = match self.progress.iter().position(|p| p.kind == kind) {
            Some(index) => index,
            None => {
                self.progress.push(CourseProgress {
                    kind,
                    enrolled: false,
                    completed: false,
                    sessions: Vec::new(),
                });
                self.progress.len() - 1
            }
        };
        &mut self.progress[index]
    }

    pub fn completed_count(&self) -> usize {
        self.progress.iter().filter(|p| p.completed).count()
    }

    pub fn enroll(&mut self, kind: CourseKind, state: &mut GameState) -> GameResult<()> {
        let course = kind.course();
        let progress = self.progress_mut(kind);
        if progress.completed {
            return Err(GameError::CourseCompleted(course.name.to_string()));
        }
        if progress.enrolled {
            return Err(GameError::AlreadyEnrolled(course.name.to_string()));
        }
        course.check_requirements(state)?;
        state.spend(course.cost)?;
        progress.enrolled = true;
        tracing::info!("Enrolled in {}", course.name);
        Ok(())
    }

    pub fn effectiveness(minutes: u32, state: &GameState) -> f64 {
        let stamina = f64::from(state.attributes.stamina) / 100.0;
        let education = f64::from(state.attributes.education_level) * 0.05;
        let penalty = f64::from(minutes.saturating_sub(120)) * 0.005;
        (0.7 * stamina + education - penalty).clamp(0.1, 1.0)
    }

    /// Study an enrolled course. The caller advances the clock.
    pub fn study(
        &mut self,
        kind: CourseKind,
        minutes: u32,
        state: &mut GameState,
        now: NaiveDateTime,
    ) -> GameResult<StudyReport> {
        let course = kind.course();
        let progress = self.progress_mut(kind);
        if !progress.enrolled {
            return Err(GameError::NotEnrolled(course.name.to_string()));
        }
        if minutes == 0 {
            return Err(GameError::InvalidAmount);
        }
        let minutes = minutes.min(Self::MAX_SESSION_MINUTES);

        let effectiveness = Self::effectiveness(minutes, state);
        let experience = (f64::from(minutes / 10) * effectiveness) as u32;
        let stamina_cost = minutes / 5;
        state.attributes.drain_stamina(stamina_cost);
        let levels_gained = state.attributes.gain_experience(experience);

        progress.sessions.push(StudySession {
            timestamp: now,
            minutes,
            effectiveness,
            experience,
        });

        Ok(StudyReport {
            minutes,
            effectiveness,
            experience,
            stamina_cost,
            levels_gained,
            total_minutes: progress.studied_minutes(),
        })
    }

    pub fn pass_probability(progress: &CourseProgress, state: &GameState) -> f64 {
        let course = progress.kind.course();
        let skill_bonus: f64 = course
            .bonuses
            .iter()
            .map(|&(skill, _)| f64::from(state.attributes.skill(skill)) * 0.02)
            .sum();
        (course.difficulty.base_rate() * progress.mean_effectiveness() + skill_bonus).clamp(0.1, 0.95)
    }

    pub fn take_exam<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        kind: CourseKind,
        state: &mut GameState,
    ) -> GameResult<ExamResult> {
        let course = kind.course();
        let progress = self.progress_mut(kind);
        if progress.completed {
            return Err(GameError::CourseCompleted(course.name.to_string()));
        }
        if !progress.enrolled {
            return Err(GameError::NotEnrolled(course.name.to_string()));
        }
        let studied = progress.studied_minutes();
        let required = course.required_minutes();
        if studied < required {
            return Err(GameError::InsufficientStudyTime { studied, required });
        }

        let probability = Self::pass_probability(progress, state);
        let passed = rng.gen_bool(probability);
        if passed {
            for &(skill, bonus) in course.bonuses {
                state.attributes.add_skill(skill, bonus);
            }
            progress.completed = true;
            progress.enrolled = false;
            tracing::info!("Passed the {} exam", course.name);
        }
        Ok(ExamResult {
            passed,
            probability,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::GameClock;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn now() -> NaiveDateTime {
        GameClock::default().now()
    }

    fn funded() -> GameState {
        let mut state = GameState::default();
        state.finances.delivery_coins = 5_000.0;
        state
    }

    #[test]
    fn test_enroll_rules() {
        let mut school = NightSchool::default();
        let mut state = funded();

        assert!(matches!(
            school.enroll(CourseKind::CustomerService, &mut state),
            Err(GameError::RequirementNotMet {
                skill: Skill::Communication,
                required: 2,
                current: 0
            })
        ));

        school.enroll(CourseKind::FirstAid, &mut state).unwrap();
        assert_eq!(state.coins(), 4_800.0);
        assert!(matches!(
            school.enroll(CourseKind::FirstAid, &mut state),
            Err(GameError::AlreadyEnrolled(_))
        ));

        let mut poor = GameState::default();
        assert!(matches!(
            school.enroll(CourseKind::Communication, &mut poor),
            Err(GameError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_effectiveness() {
        let mut state = GameState::default();
        assert!((NightSchool::effectiveness(60, &state) - 0.75).abs() < 1e-9);
        assert!((NightSchool::effectiveness(180, &state) - 0.45).abs() < 1e-9);
        state.attributes.stamina = 0;
        assert!((NightSchool::effectiveness(180, &state) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_study_caps_minutes() {
        let mut school = NightSchool::default();
        let mut state = funded();
        assert!(matches!(
            school.study(CourseKind::TrafficSafety, 60, &mut state, now()),
            Err(GameError::NotEnrolled(_))
        ));
        school.enroll(CourseKind::TrafficSafety, &mut state).unwrap();

        let report = school
            .study(CourseKind::TrafficSafety, 300, &mut state, now())
            .unwrap();
        assert_eq!(report.minutes, 180);
        assert_eq!(report.stamina_cost, 36);
        // 18 * 0.45
        assert_eq!(report.experience, 8);
        assert_eq!(state.attributes.stamina, 64);
        assert_eq!(state.attributes.experience, 8);
        assert_eq!(report.total_minutes, 180);
    }

    #[test]
    fn test_exam_needs_study_time() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut school = NightSchool::default();
        let mut state = funded();
        school.enroll(CourseKind::TrafficSafety, &mut state).unwrap();
        school
            .study(CourseKind::TrafficSafety, 120, &mut state, now())
            .unwrap();
        assert_eq!(
            school.take_exam(&mut rng, CourseKind::TrafficSafety, &mut state),
            Err(GameError::InsufficientStudyTime {
                studied: 120,
                required: 900
            })
        );
    }

    #[test]
    fn test_passing_exam_applies_bonuses() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut school = NightSchool::default();
        let mut state = funded();
        school.enroll(CourseKind::TrafficSafety, &mut state).unwrap();
        while school.progress(CourseKind::TrafficSafety).unwrap().studied_minutes() < 900 {
            state.attributes.stamina = 100;
            school
                .study(CourseKind::TrafficSafety, 120, &mut state, now())
                .unwrap();
        }

        let result = loop {
            let result = school
                .take_exam(&mut rng, CourseKind::TrafficSafety, &mut state)
                .unwrap();
            if result.passed {
                break result;
            }
        };
        assert!((0.1..=0.95).contains(&result.probability));
        assert_eq!(state.attributes.traffic_safety, 3);
        assert_eq!(state.attributes.direction_sense, 2);
        assert_eq!(school.completed_count(), 1);
        assert!(matches!(
            school.enroll(CourseKind::TrafficSafety, &mut state),
            Err(GameError::CourseCompleted(_))
        ));
    }

    #[test]
    fn test_courses_table() {
        let courses = NightSchool::courses();
        assert_eq!(courses.len(), 6);
        for kind in CourseKind::iter() {
            assert_eq!(kind.course().kind, kind);
        }
        assert_eq!(CourseKind::English.course().required_minutes(), 3000);
    }
}
