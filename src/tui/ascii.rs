pub const LOGO: [&str; 4] = [
    " ___  ___  ___ ",
    "/ __|/ _ \\| _ \\",
    "\\__ \\ (_) |  _/",
    "|___/\\___/|_|  ",
];

pub const BANNER: [&str; 3] = [
    "IMPORTANT: This bot provides EXPLANATIONS ONLY.",
    "It does NOT approve actions or replace supervisor authority.",
    "Always consult your supervisor before performing any task.",
];
