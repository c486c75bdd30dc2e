/// Asserts that no live cell, and no sub-region of one, is split in pieces.
#[macro_export]
macro_rules! assert_connected {
    ($potts:expr) => {
        let split = $potts.validate_connectivity();
        assert!(split.is_empty(), "Cells split into pieces: {:?}", split);
    };
}

/// Asserts that every guard-border voxel is still medium.
#[macro_export]
macro_rules! assert_border_clear {
    ($potts:expr) => {
        assert!(
            $potts.lattice().border_is_clear(),
            "Guard border was written"
        );
    };
}

/// Asserts that the lattice arrays and every cell's voxel set agree.
#[macro_export]
macro_rules! assert_views_consistent {
    ($potts:expr) => {
        let lattice = $potts.lattice();
        for cell in $potts.cells().iter() {
            let location = cell.location();
            let painted = lattice.ids().iter().filter(|&&id| id == cell.id()).count();
            assert_eq!(
                painted,
                location.volume(),
                "Cell {} painted {} voxels but tracks {}",
                cell.id(),
                painted,
                location.volume()
            );
            for v in location.voxels() {
                assert_eq!(lattice.id(v), cell.id(), "Cell {} lost voxel {}", cell.id(), v);
                if let Some(region) = location.region_of(v) {
                    assert_eq!(lattice.region(v), region, "Region mismatch at {}", v);
                }
            }
            assert_eq!(
                location.surface(),
                location.all().calculate_surface(),
                "Cell {} surface drifted",
                cell.id()
            );
        }
    };
}
