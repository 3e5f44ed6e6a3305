//! The compiled-in roster.

use crate::models::{Group, Player, Rank, Skill, StatBlock};

const FOUR_FINGER: &str = "four-finger";
const CLASSIC: &str = "classic";
const PENHOLD: &str = "penhold";
const HORIZONTAL: &str = "horizontal";

const SPIN_MASTER: &str = "Spin Master";
const BLACK_SCREEN: &str = "Black Screen";
const QUICK_LEARNING: &str = "Quick Learning";
const MIRROR_REACTION: &str = "Mirror Reaction";
const LOGICAL_ADAPTATION: &str = "Logical Adaptation";
const BLOODLUST: &str = "Bloodlust";
const FAKE_SERVE: &str = "Fake Serve";

pub(super) fn builtin() -> (Vec<Group>, Vec<Skill>) {
    (groups(), skills())
}

fn skills() -> Vec<Skill> {
    vec![
        Skill::new(
            SPIN_MASTER,
            "Advanced understanding of spin and how it behaves off the rubber and the table.",
            Some(Rank::S),
        ),
        Skill::new(
            BLACK_SCREEN,
            "An almost feral state: no reasoning, no plan, fully immersed in the rally and playing on instinct alone.",
            Some(Rank::S),
        ),
        Skill::new(
            QUICK_LEARNING,
            "Turns the player into a learning machine: picks up new patterns in moments, reads the game fast and keeps refining itself.",
            Some(Rank::S),
        ),
        Skill::new(
            MIRROR_REACTION,
            "Knows where the ball will bounce and sets the racket so it comes back the instant it lands.",
            Some(Rank::A),
        ),
        Skill::new(
            LOGICAL_ADAPTATION,
            "Adapts quickly to new shots and to unfamiliar opponents.",
            Some(Rank::A),
        ),
        Skill::new(
            BLOODLUST,
            "Always finds the right ball to finish the point, whatever side of the table it lands on.",
            Some(Rank::A),
        ),
        Skill::new(
            FAKE_SERVE,
            "Looks at one side of the opponent's table and serves fast to the other, cutting their reaction time.",
            Some(Rank::B),
        ),
    ]
}

fn groups() -> Vec<Group> {
    vec![
        Group::new("6", "6th grade", vec![]),
        Group::new("7", "7th grade", vec![]),
        Group::new("8", "8th grade", eighth_grade()),
        Group::new("9", "9th grade", ninth_grade()),
        Group::new("Extra", "Extra", extra()),
    ]
}

fn eighth_grade() -> Vec<Player> {
    vec![Player::new(
        "8-kevin",
        "Kevin",
        StatBlock::new(8, 5, 6, 4, 8),
        "Built to finish points and unable to hold back during a match, which ends up hurting his defense.",
        FOUR_FINGER,
    )
    .with_weaknesses(&[
        "Defense exposed by excessive aggression",
        "Lack of offensive self-control",
    ])
    .with_skills(&[BLOODLUST])]
}

fn ninth_grade() -> Vec<Player> {
    vec![
        Player::new(
            "9-dutra",
            "Dutra",
            StatBlock::new(7, 9, 8, 6, 8),
            "A natural talent who learns fast and memorizes mid-length patterns. The best plan is relentless attack: however high his defense, the shield always breaks.",
            CLASSIC,
        )
        .with_weaknesses(&["Relentless attack (the shield breaks)", "Constant pressure"])
        .with_skills(&[QUICK_LEARNING, LOGICAL_ADAPTATION]),
        Player::new(
            "9-ph",
            "PH",
            StatBlock::new(4, 5, 4, 3, 4),
            "Below average and not improving much over time. Knows the basics and the rules but does not seem to see why he is stuck.",
            FOUR_FINGER,
        )
        .with_weaknesses(&["No visible progress", "Basic technical difficulties"]),
        Player::new(
            "9-miguel",
            "Miguel",
            StatBlock::new(6, 6, 6, 8, 8),
            "Has the makings of great game vision and may learn to predict movements. Still lacks control over when to attack; with practice he can be far more than average.",
            CLASSIC,
        )
        .with_weaknesses(&["Lack of control when attacking", "Offensive timing"]),
        Player::new(
            "9-breno",
            "Breno",
            StatBlock::new(7, 7, 7, 7, 6),
            "Talented, learns fast and studies other matches to borrow techniques. A balanced player in constant progress; keep playing to his left side and his defense eventually breaks.",
            FOUR_FINGER,
        )
        .with_weaknesses(&["Vulnerable left side"]),
        Player::new(
            "9-romagnoli",
            "Romagnoli",
            StatBlock::new(8, 9, 8, 9, 9),
            "A spin genius with an elegant classic style. A wolf in sheep's clothing hiding ready attacks behind calm and seriousness, yet unstable despite great numbers.",
            CLASSIC,
        )
        .with_weaknesses(&["Emotional and technical instability"])
        .with_specialty("Spin")
        .with_skills(&[SPIN_MASTER, LOGICAL_ADAPTATION, BLOODLUST]),
        Player::new(
            "9-matheus",
            "Matheus",
            StatBlock::new(8, 6, 7, 4, 6),
            "An interesting penhold style that is good to watch. Like an uncut gem he has potential but does not invest in it, and he cannot handle fast attacks.",
            PENHOLD,
        )
        .with_weaknesses(&["Fast attacks", "Lack of training"]),
        Player::new(
            "9-nicollas",
            "Nicollas",
            StatBlock::new(9, 9, 7, 8, 10),
            "The current peak of the roster. Being left-handed is a huge advantage, paired with quick thinking and confidence.",
            FOUR_FINGER,
        )
        .with_weaknesses(&[
            "Overconfidence (occasional)",
            "Excessive anger at lucky points from the opponent",
        ])
        .with_skills(&[QUICK_LEARNING, MIRROR_REACTION, FAKE_SERVE, LOGICAL_ADAPTATION]),
        Player::new(
            "9-leonardo",
            "Leonardo",
            StatBlock::new(8, 8, 7, 7, 8),
            "Adaptable and gets better the more he plays the same opponent. Plays almost purely on instinct; weak when talking mid-rally and on the upper left side.",
            FOUR_FINGER,
        )
        .with_weaknesses(&["Talking while playing", "Upper left side"])
        .with_skills(&[BLACK_SCREEN, FAKE_SERVE, LOGICAL_ADAPTATION]),
        Player::new(
            "9-yan",
            "Yan",
            StatBlock::new(6, 7, 6, 7, 7),
            "A sly player, always ready to chop or finish, usually with a card up his sleeve.",
            FOUR_FINGER,
        )
        .with_skills(&[FAKE_SERVE]),
        Player::new(
            "9-catota",
            "Catota",
            StatBlock::new(5, 7, 4, 1, 3),
            "Average to below average with a static, inflexible game. His defense is easily broken by high-speed attacks.",
            HORIZONTAL,
        )
        .with_weaknesses(&[
            "Static playing style",
            "No flexibility",
            "Defense vulnerable to high speed",
        ]),
        Player::new(
            "9-enzio",
            "Enzio",
            StatBlock::new(4, 5, 2, 0, 3),
            "Semi-retired with no standout quality; needs to learn spin.",
            HORIZONTAL,
        )
        .with_weaknesses(&["No spin", "No standout technical qualities"]),
    ]
}

fn extra() -> Vec<Player> {
    vec![Player::new(
        "extra-arakem",
        "Arakem",
        StatBlock::new(7, 8, 8, 7, 8),
        "Fast and smart with a good defense, but has the usual hole on the left side and too many failed attacks.",
        PENHOLD,
    )
    .with_weaknesses(&["Vulnerable left side", "Failed attack attempts"])]
}
