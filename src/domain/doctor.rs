/// Doctors that accept OPD appointments. The booking form only offers these names.
pub const DOCTORS: [&str; 5] = [
    "Dr. Rajesh Sharma",
    "Dr. Priya Patel",
    "Dr. Amit Singh",
    "Dr. Sunita Gupta",
    "Dr. Vikram Verma",
];

/// Returns the canonical roster entry matching `name`, ignoring surrounding whitespace.
pub fn find_doctor(name: &str) -> Option<&'static str> {
    let name = name.trim();
    DOCTORS.iter().copied().find(|doctor| *doctor == name)
}
