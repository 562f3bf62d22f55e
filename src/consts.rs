/// Global energy rescaling factor of the Hamiltonian.
pub const PATH_ENERGY_SCALE: &str = "/EnergyScale";

/// Number of orbitals per unit cell.
pub const PATH_N_ORBITALS: &str = "/NOrbitals";

/// Lattice lengths, one per dimension.
pub const PATH_LENGTHS: &str = "/L";

/// Domain decomposition, one entry per dimension.
pub const PATH_DIVISIONS: &str = "/Divisions";

pub const PATH_DISORDER_GROUP: &str = "/Hamiltonian/Disorder";
pub const PATH_DISORDER_ORBITALS: &str = "/Hamiltonian/Disorder/OrbitalNum";
pub const PATH_DISORDER_MODELS: &str = "/Hamiltonian/Disorder/OnsiteDisorderModelType";
pub const PATH_DISORDER_MEANS: &str = "/Hamiltonian/Disorder/OnsiteDisorderMeanValue";
pub const PATH_DISORDER_SPREADS: &str = "/Hamiltonian/Disorder/OnsiteDisorderMeanStdv";

pub const PATH_STRUCTURAL_DISORDER: &str = "/Hamiltonian/StructuralDisorder";

pub const PATH_N_HOPPINGS: &str = "/Hamiltonian/NHoppings";
pub const PATH_HOPPINGS: &str = "/Hamiltonian/Hoppings";

/// Address table sentinel for an orbital with no on-site disorder.
pub const ADDRESS_UNASSIGNED: i64 = -2;

/// Address table sentinel for an orbital with a fixed on-site energy.
pub const ADDRESS_DETERMINISTIC: i64 = -1;

/// Edge length (in unit cells) of one structural domain tile.
pub const DOMAIN_TILE: usize = 2;

/// Ghost layer thickness exchanged across domain borders.
pub const GHOST_WIDTH: usize = 2;

/// Largest supported lattice dimension.
pub const MAX_DIMENSIONS: usize = 3;
