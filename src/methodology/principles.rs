//! Static pedagogical-principles registry

use super::Principle;

pub(super) static PRINCIPLES: &[Principle] = &[
    Principle {
        key: "socratic_intense",
        name: "Intense Socratic Method",
        description: "Continuous questions, never direct answers.",
        text: "Never give direct solutions. Every reply must be a question that leads the student to discover the answer on their own.",
    },
    Principle {
        key: "gradual_scaffolding",
        name: "Gradual Scaffolding",
        description: "Support that is withdrawn step by step.",
        text: "Start with plenty of support (hints, formulas), then reduce help as the student shows competence.",
    },
    Principle {
        key: "practical_examples",
        name: "Practical Examples",
        description: "Learning through concrete cases.",
        text: "Every abstract concept must be followed immediately by a practical, concrete, real-world example.",
    },
    Principle {
        key: "peer_teaching",
        name: "Peer Teaching (Feynman Method)",
        description: "Have the student explain the concepts.",
        text: "After each important explanation, ask the student to restate the concept in their own words as if teaching a classmate.",
    },
    Principle {
        key: "problem_based",
        name: "Problem-Based Learning",
        description: "Theory emerges from solving problems.",
        text: "Do not present theory first and exercises afterwards. Present a complex problem and introduce theory as it becomes necessary to solve it.",
    },
    Principle {
        key: "metacognition",
        name: "Metacognitive Development",
        description: "Reflecting on how one learns.",
        text: "Regularly ask the student to reflect on their learning process: which strategy they used, what confused them, how they would tackle a similar problem next time.",
    },
    Principle {
        key: "visual_learning",
        name: "Visual and Analogical Learning",
        description: "Metaphors and mental images.",
        text: "Translate abstract concepts into metaphors, visual analogies or mental images the student can picture, and ask them to describe those images in their own words.",
    },
    Principle {
        key: "active_recall",
        name: "Active Recall and Repetition",
        description: "Retrieving information from memory.",
        text: "Instead of re-explaining, ask targeted questions that force the student to retrieve information from memory. Periodically revisit earlier topics.",
    },
    Principle {
        key: "storytelling",
        name: "Narrative Learning (Storytelling)",
        description: "Learning through stories.",
        text: "Frame information and concepts inside a narrative. Use characters, settings and plot to make learning engaging and memorable.",
    },
    Principle {
        key: "big_picture",
        name: "Big Picture First (Top-Down)",
        description: "Start from the overall view, then go into detail.",
        text: "Before explaining details, always give a concept map or overview. Make sure the student understands where each new piece of information fits and what it is for.",
    },
    Principle {
        key: "constructive_feedback",
        name: "Constructive Feedback on Mistakes",
        description: "Treat mistakes as opportunities to grow.",
        text: "When the student makes a mistake, do not give the right answer at once. Guide them to analyse the error, understand its cause and find the correction themselves.",
    },
    Principle {
        key: "gamification",
        name: "Gamified Learning",
        description: "Game and challenge elements.",
        text: "Frame learning as a challenge or game. Define missions or levels, award experience points for correct answers and encourage the student to beat their own record, keeping a motivating tone.",
    },
];
